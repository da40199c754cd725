//! Configuration source implementations.

mod config_source;
mod env;
mod file;

pub use config_source::ConfigSource;
pub(crate) use config_source::flatten_properties;
pub use env::EnvSource;
pub use file::FileSource;
