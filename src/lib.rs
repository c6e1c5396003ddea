//! # wildfire - bulk repository orchestrator
//!
//! `wildfire` keeps a registry of source repositories ("projects"), organizes
//! them into named groups, and clones whole groups concurrently onto local
//! disk. A command can then be run across every cloned working copy.
//!
//! ## Quick Start
//!
//! ```bash
//! wildfire project add api git https://github.com/acme/api.git
//! wildfire project add web gitlab https://gitlab.com/acme/web.git
//! wildfire group create backend api web
//! wildfire clone group backend ~/work --exec "git log -1 --oneline" --show-output api
//! ```
//!
//! The registry lives in `./.wildfire.yaml` unless `--config` or
//! `WILDFIRE_CONFIG` points elsewhere:
//!
//! ```yaml
//! projects:
//!   api: { name: api, type: git, url: https://github.com/acme/api.git }
//! groups:
//!   backend: [api, web]
//! ```
//!
//! ## Architecture
//!
//! - [`domain`]: projects, groups and the registry
//! - [`application`]: the repository orchestrator and the command runner
//! - [`infrastructure`]: libgit2 cloning, YAML persistence, process execution
//! - [`presentation`]: CLI interface and terminal output
//! - [`common`]: shared error handling
//!
//! ## Using the Library
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use wildfire::application::use_cases::pull_repositories::ProjectRepositoryService;
//! use wildfire::infrastructure::filesystem::registry_store::RegistryStore;
//! use wildfire::infrastructure::scm::git_cloner::GitCloner;
//!
//! # async fn example() -> wildfire::Result<()> {
//! let registry = RegistryStore::new(".wildfire.yaml").load()?;
//! let service = ProjectRepositoryService::new(&registry, Arc::new(GitCloner::new()))
//!     .with_max_parallel(8);
//!
//! if let Some(group) = registry.get_group("backend") {
//!     service.pull_group(Path::new("/tmp/backend"), group).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - [`common::error::WildfireError`]: Main error type with detailed context
//! - [`common::result::WildfireResult`]: Type alias for `Result<T, WildfireError>`

#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::WildfireError;
pub use crate::common::result::WildfireResult as Result;
