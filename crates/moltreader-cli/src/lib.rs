//! Command-line adapter for moltreader.
//!
//! `read` speaks a page in the terminal with transport commands on stdin,
//! `serve` starts the web variant, `voices` lists the voice pool.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

// Used by the binary target only
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod input;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{Backend, Commands, SpeechProgram};
pub use error::CliError;
pub use input::ReaderInput;
pub use parser::Cli;
