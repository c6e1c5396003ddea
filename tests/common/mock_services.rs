//! Mock services for testing
//!
//! Hand-rolled fakes for the cloner and progress seams. They record every call
//! so tests can verify which projects were attempted and where.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;
use wildfire::application::services::progress::ProgressReporter;
use wildfire::domain::entities::project::Project;
use wildfire::infrastructure::scm::cloner::{CloneError, Cloner};

/// Mock cloner recording every clone request
#[derive(Default)]
pub struct MockCloner {
    /// (project name, destination) per call
    calls: Arc<Mutex<Vec<(String, PathBuf)>>>,
    /// Projects whose clone fails
    failing: HashSet<String>,
    /// When set, every clone waits here before returning
    barrier: Option<Arc<Barrier>>,
}

impl MockCloner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the clone of each named project with "repository not found"
    pub fn failing<I, S>(projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            failing: projects.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Every clone blocks until `parties` clones are in flight at once
    pub fn rendezvous(parties: usize) -> Self {
        Self {
            barrier: Some(Arc::new(Barrier::new(parties))),
            ..Self::default()
        }
    }

    /// Get call history for verification
    pub fn get_call_history(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }

    /// Names of the projects a clone was attempted for, sorted
    pub fn cloned_projects(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .get_call_history()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        names.sort();
        names
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn clear_call_history(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl Cloner for MockCloner {
    async fn clone_project(&self, path: &Path, project: &Project) -> Result<(), CloneError> {
        self.calls
            .lock()
            .unwrap()
            .push((project.name.clone(), path.to_path_buf()));

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }

        if self.failing.contains(&project.name) {
            return Err(CloneError::new("repository not found"));
        }
        Ok(())
    }
}

/// Progress observer counting every notification
#[derive(Default)]
pub struct RecordingProgress {
    pub total: AtomicU64,
    pub increments: AtomicU64,
    pub completions: AtomicU64,
}

impl RecordingProgress {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn increments(&self) -> u64 {
        self.increments.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    pub fn completions(&self) -> u64 {
        self.completions.load(Ordering::SeqCst)
    }
}

impl ProgressReporter for RecordingProgress {
    fn start(&self, total: u64) {
        self.total.store(total, Ordering::SeqCst);
    }

    fn increment(&self) {
        self.increments.fetch_add(1, Ordering::SeqCst);
    }

    fn complete(&self) {
        self.completions.fetch_add(1, Ordering::SeqCst);
    }
}
