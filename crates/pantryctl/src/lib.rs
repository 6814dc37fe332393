//! Pantryctl library - exposes modules for testing

pub mod cli;
pub mod client;
pub mod commands;
pub mod errors;
pub mod logging;
pub mod output;
pub mod prompt;
pub mod resize;
