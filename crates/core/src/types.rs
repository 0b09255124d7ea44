use thiserror::Error;

/// The main error type for werr operations
///
/// Only configuration problems are errors. A command exiting non-zero is
/// ordinary data carried by [`crate::execution::CommandResult`].
#[derive(Debug, Error)]
pub enum WerrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Task '{0}' not found")]
    UnknownTask(String),

    #[error("Task '{task}' needs '{missing}' which was not found")]
    UnknownDependency { task: String, missing: String },

    #[error("Circular dependency detected: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    #[error("No commands match name: {filter}, available: {}", .available.join(", "))]
    NoMatchingCommands {
        filter: String,
        available: Vec<String>,
    },

    #[error("Unknown reporter: {0}")]
    UnknownReporter(String),

    #[error("Task error: {0}")]
    Task(String),
}

/// Result type alias for werr operations
pub type WerrResult<T> = Result<T, WerrError>;
