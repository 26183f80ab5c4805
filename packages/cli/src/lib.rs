//! citelaw CLI - command-line front end for the citation resolver.
//!
//! - [`cli`]: Argument parsing and commands
//! - [`error`]: Error types and Result alias

pub mod cli;
pub mod error;

pub use error::{CliError, Result};
