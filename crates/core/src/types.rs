use thiserror::Error;

/// The main error type for sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Workspace error: {0}")]
    Workspace(String),

    #[error("Failed to spawn '{program}' for project '{project}': {source}")]
    Spawn {
        project: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Task error: {0}")]
    Task(String),
}

/// Result type alias for sweep operations
pub type SweepResult<T> = Result<T, SweepError>;
