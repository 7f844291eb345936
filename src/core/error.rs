use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Unknown strategy profile: {0}")]
    UnknownStrategy(String),

    #[error("Unknown terrain preset: {0}")]
    UnknownTerrainPreset(String),

    #[error("Unknown unit role: {0}")]
    UnknownRole(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
