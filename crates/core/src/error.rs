use thiserror::Error;

pub type IntelResult<T> = Result<T, IntelError>;

#[derive(Error, Debug)]
pub enum IntelError {
    #[error("Data load error in source '{source_name}': {reason}")]
    DataLoad { source_name: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntelError {
    /// Build a [`IntelError::DataLoad`] for the named source.
    pub fn data_load(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataLoad {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending source, when the error is tied to one.
    pub fn source_name(&self) -> Option<&str> {
        match self {
            Self::DataLoad { source_name, .. } => Some(source_name),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for IntelError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
