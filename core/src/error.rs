use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {field} {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Unrecognized granularity '{value}'")]
    UnknownGranularity { value: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReportError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
