use std::path::PathBuf;

/// Result type for a report build
pub type BuildResult<T> = Result<T, ReportError>;

/// Every failure aborts the whole build; nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Data access error: {0}")]
    DataAccess(String),

    #[error("Chart artifact {path:?} is missing or unreadable: {reason}")]
    MissingArtifact { path: PathBuf, reason: String },

    #[error("Cannot resolve resource {what}: {reason}")]
    ResourceResolution { what: String, reason: String },

    #[error("Render error: {0}")]
    Render(String),
}

impl ReportError {
    pub fn data(msg: impl Into<String>) -> Self {
        ReportError::DataAccess(msg.into())
    }

    pub fn resource(what: impl std::fmt::Display, reason: impl std::fmt::Display) -> Self {
        ReportError::ResourceResolution {
            what: what.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn artifact(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        ReportError::MissingArtifact {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
