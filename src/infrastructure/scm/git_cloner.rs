use super::cloner::{CloneError, Cloner};
use crate::domain::entities::project::Project;
use async_trait::async_trait;
use git2::{build::RepoBuilder, FetchOptions, RemoteCallbacks};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Git cloner backed by libgit2
///
/// Every project type goes through the same generic clone; the type only
/// affects how the project is displayed.
#[derive(Debug, Clone, Default)]
pub struct GitCloner {
    branch: Option<String>,
}

impl GitCloner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check out `branch` instead of the remote HEAD
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    fn clone_blocking(
        url: &str,
        path: &Path,
        name: &str,
        branch: Option<&str>,
    ) -> Result<(), CloneError> {
        if path.exists() {
            let mut entries = std::fs::read_dir(path)?;
            if entries.next().is_some() {
                return Err(CloneError::new(format!(
                    "destination path '{}' already exists and is not an empty directory",
                    path.display()
                )));
            }
        } else if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut callbacks = RemoteCallbacks::new();
        callbacks.transfer_progress(|stats| {
            debug!(
                project = name,
                received = stats.received_objects(),
                total = stats.total_objects(),
                bytes = stats.received_bytes(),
                "Transfer progress"
            );
            true
        });

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(callbacks);

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_options);
        if let Some(branch) = branch {
            builder.branch(branch);
        }

        builder.clone(url, path)?;
        Ok(())
    }
}

#[async_trait]
impl Cloner for GitCloner {
    async fn clone_project(&self, path: &Path, project: &Project) -> Result<(), CloneError> {
        info!(
            project = %project.name,
            project_type = %project.project_type,
            url = %project.url,
            path = %path.display(),
            "Cloning project"
        );

        let url = project.url.clone();
        let name = project.name.clone();
        let target: PathBuf = path.to_path_buf();
        let branch = self.branch.clone();

        tokio::task::spawn_blocking(move || {
            Self::clone_blocking(&url, &target, &name, branch.as_deref())
        })
        .await
        .map_err(|e| CloneError::with_source("clone task did not complete", e))?
    }
}
