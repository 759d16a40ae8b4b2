//! # Shell Module
//!
//! Entry point and argument handling for the `crossfs` binary.
//!
//! - **`cli`**: argument parsing, settings and logging setup, subcommand dispatch
//! - **`report`**: the result of a subcommand, rendered as text or JSON

pub mod cli;
pub mod report;

pub use cli::{Cli, Command, OutputFormat, dispatch, run};
pub use report::{PlatformReport, Report};
