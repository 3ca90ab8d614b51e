mod env_overrides;
mod loader;
pub mod locale;
pub mod types;

#[cfg(test)]
pub(crate) mod test_env;

pub use types::Config;
