#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en");

pub mod channels;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod runtime;
pub mod security;
pub mod session;
#[doc(hidden)]
pub mod utils;

pub use config::Config;
pub use error::{GateError, Result};
