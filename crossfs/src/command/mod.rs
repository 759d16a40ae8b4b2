//! Command-line guarding: metacharacter scanning, executable parsing,
//! sanitization of caller-supplied commands, and rendering of the native
//! search and copy commands.

pub mod builder;
pub mod guard;
pub mod parser;
pub mod sanitizer;

pub use builder::{BuiltCommand, build_copy_command, build_search_command};
pub use guard::{GuardPolicy, SingleQuotes, assert_safe, assert_safe_with};
pub use parser::{ParsedExecutable, QuoteStyle, parse_executable};
pub use sanitizer::{
    SanitizedCommand, ensure_safe_executable, sanitize_command, sanitize_command_with,
};

/// A command line that went through this module and may be handed to a shell.
///
/// Implemented only by [`SanitizedCommand`] and [`BuiltCommand`], so raw
/// strings cannot reach [`crate::exec::ShellRunner`].
pub trait ShellLine {
    fn as_shell_line(&self) -> &str;
}
