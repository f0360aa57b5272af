// ABOUTME: Error type for server startup and maintenance commands
// ABOUTME: Wraps configuration, storage, and state wiring failures

use laundrylens_api::StateError;
use laundrylens_config::ConfigError;
use laundrylens_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to initialize services: {0}")]
    State(#[from] StateError),

    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
