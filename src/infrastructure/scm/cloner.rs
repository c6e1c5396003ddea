use crate::domain::entities::project::Project;
use async_trait::async_trait;
use std::path::Path;

/// Materializes a single project's remote source as a local working copy
///
/// The orchestrator runs each clone of a batch on its own spawned task, so
/// implementations must be `Send + Sync` and should move blocking work onto
/// the blocking pool.
#[async_trait]
pub trait Cloner: Send + Sync {
    /// Clone `project` into `path`
    ///
    /// `path` must not exist or must be empty. Every failure (network,
    /// authentication, unreachable URL, unwritable path) is reported as a
    /// [`CloneError`] carrying a human-readable message.
    async fn clone_project(&self, path: &Path, project: &Project) -> Result<(), CloneError>;
}

/// Failure reported by a [`Cloner`]
///
/// Callers only ever look at the message; the source is kept for logging.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CloneError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CloneError {
    /// Create a clone error from a plain message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a clone error wrapping an underlying failure
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Human-readable failure message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<git2::Error> for CloneError {
    fn from(error: git2::Error) -> Self {
        Self::with_source(error.message().to_string(), error)
    }
}

impl From<std::io::Error> for CloneError {
    fn from(error: std::io::Error) -> Self {
        Self::with_source(error.to_string(), error)
    }
}
