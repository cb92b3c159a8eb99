#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read persisted state: {0}")]
    PersistRead(std::io::Error),
    #[error("failed to write persisted state: {0}")]
    PersistWrite(std::io::Error),
    #[error("failed to serialize persisted state: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize persisted state: {0}")]
    Deserialization(serde_json::Error),
}

pub type HubResult<T> = std::result::Result<T, HubError>;
