use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyrinxError {
    #[error("Config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The id is not registered in this graph, typically an endpoint
    /// living in another system's graph.
    #[error("Unknown candidate id: {0}")]
    UnknownInter(u32),

    #[error("Candidate {0} is deleted")]
    DeletedInter(u32),
}

pub type Result<T> = std::result::Result<T, SyrinxError>;
