pub mod config;
pub mod error;
pub mod types;

pub use config::ConfidanteConfig;
pub use error::{ConfidanteError, Result};
pub use types::*;
