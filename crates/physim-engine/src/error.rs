//! Error types for the engine binary.

use physim_core::ConfigError;
use physim_db::DbError;
use physim_observer::StartupError;

/// Errors that can abort engine startup.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The history database could not be opened or migrated.
    #[error("database error: {0}")]
    Database(#[from] DbError),

    /// The observer server could not be spawned.
    #[error("observer error: {0}")]
    Observer(#[from] StartupError),
}
