//! Core configuration store types.

mod builder;
mod configuration;
mod loader;
mod store;
mod validation;

pub use builder::ConfigurationBuilder;
pub use configuration::Configuration;
pub(crate) use loader::ConfigLoader;
pub use validation::PropertyValidator;
