//! Application layer: the repository orchestrator and the command runner

pub mod services;
pub mod use_cases;
