use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("configuration fetch failed: {0}")]
    ConfigFetchFailed(String),

    #[error("configuration parse failed: {0}")]
    ConfigParseFailed(String),

    #[error("database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("write failed: {0}")]
    WriteFailed(String),

    #[error("missing device identity: {0}")]
    MissingIdentity(String),
}

impl AgentError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, AgentError::MissingIdentity(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::ConfigFetchFailed(_) => "ConfigFetchFailed",
            AgentError::ConfigParseFailed(_) => "ConfigParseFailed",
            AgentError::ConnectionFailed(_) => "ConnectionFailed",
            AgentError::WriteFailed(_) => "WriteFailed",
            AgentError::MissingIdentity(_) => "MissingIdentity",
        }
    }
}
