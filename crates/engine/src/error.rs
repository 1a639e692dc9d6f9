use skipper_protocol::RunModelError;
use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that end the process without a verdict.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("data integrity error: {0}")]
    DataIntegrity(#[from] RunModelError),
}
