use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchError {
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Failed to parse decision: {0}")]
    ParseError(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ArchError>;
