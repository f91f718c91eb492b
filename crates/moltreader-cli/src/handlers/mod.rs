//! Command handlers.
//!
//! Each handler is `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`:
//! it validates CLI input, calls into the composed services and formats
//! output for the terminal.

pub mod read;
pub mod serve;
pub mod voices;
