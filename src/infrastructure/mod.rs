//! Infrastructure layer modules
//!
//! This layer provides concrete implementations for external system interactions:
//! - Cloning remote repositories (libgit2)
//! - Registry persistence (YAML file)
//! - Process execution (commands run inside working copies)

pub mod filesystem;
pub mod process;
pub mod scm;

pub use filesystem::registry_store::{RegistryStore, RegistryStoreError};
pub use process::CommandExecutor;
pub use scm::{CloneError, Cloner, GitCloner};
