//! Presentation layer: clap command surface and terminal output

pub mod cli;
pub mod ui;
