//! Portico Core: entity models, network projection, schema validation, configuration.

pub mod config;
pub mod error;
pub mod model;
pub mod network;
pub mod validate;

pub use config::PorticoConfig;
pub use error::{Error, Result};
pub use model::*;
pub use network::*;
