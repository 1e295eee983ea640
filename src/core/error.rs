use thiserror::Error;

#[derive(Error, Debug)]
pub enum FairwayError {
    #[error("Invalid course: {0}")]
    InvalidCourse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Player already registered: {0}")]
    DuplicatePlayer(String),

    #[error("Unknown player kind: {0}")]
    UnknownPlayer(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, FairwayError>;
