//! Source control operations
//!
//! `Cloner` is the seam the orchestrator depends on; `GitCloner` is the
//! libgit2-backed implementation used by the CLI.

pub mod cloner;
pub mod git_cloner;

pub use cloner::{CloneError, Cloner};
pub use git_cloner::GitCloner;
