//! Terminal channel for the StudyMate conversation loop.

pub mod cli;
mod line_editor;

pub use cli::CliChannel;
