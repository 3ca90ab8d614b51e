pub mod access;
pub mod allowlist_file;

pub use access::{AccessController, AccessLists};
pub use allowlist_file::{AccessListStore, JsonAccessFile};
