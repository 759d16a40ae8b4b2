use std::fmt;

use super::ShellLine;
use super::guard::{self, GuardPolicy};
use super::parser::{self, QuoteStyle};
use crate::error::GuardError;
use crate::platform::{PlatformProfile, ShellDialect};

/// A command line whose executable is canonically quoted and whose arguments
/// carry no unguarded metacharacter. Only [`sanitize_command`] builds one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SanitizedCommand(String);

impl SanitizedCommand {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SanitizedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for SanitizedCommand {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SanitizedCommand {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl ShellLine for SanitizedCommand {
    fn as_shell_line(&self) -> &str {
        &self.0
    }
}

/// Validate a bare executable path and return it in canonical quoting.
///
/// The whole input is the executable; a quoted input may not carry anything
/// after its closing quote.
pub fn ensure_safe_executable(path: &str, profile: &PlatformProfile) -> Result<String, GuardError> {
    let trimmed = path.trim();
    let quote = match trimmed.chars().next() {
        Some('"') => Some(QuoteStyle::Double),
        Some('\'') if profile.dialect() == ShellDialect::Posix => Some(QuoteStyle::Single),
        _ => None,
    };

    let Some(style) = quote else {
        return requote(trimmed, None, profile);
    };

    let parsed = parser::parse_executable(trimmed, profile)?;
    debug_assert_eq!(parsed.quote, Some(style));
    if !parsed.remainder.trim().is_empty() {
        return Err(GuardError::UnsafeExecutable {
            executable: trimmed.to_string(),
            found: "arguments after the executable",
            platform: profile.name(),
        });
    }
    requote(parsed.executable, parsed.quote, profile)
}

/// Sanitize a full command line with the default [`GuardPolicy`].
pub fn sanitize_command(
    command: &str,
    profile: &PlatformProfile,
) -> Result<SanitizedCommand, GuardError> {
    sanitize_command_with(command, profile, GuardPolicy::default())
}

/// Parse the executable, re-quote it, and guard the remainder.
///
/// The result is a fixed point: sanitizing it again returns it unchanged.
pub fn sanitize_command_with(
    command: &str,
    profile: &PlatformProfile,
    policy: GuardPolicy,
) -> Result<SanitizedCommand, GuardError> {
    let parsed = parser::parse_executable(command, profile)?;
    let token = requote(parsed.executable, parsed.quote, profile)?;
    guard::assert_safe_with(parsed.remainder, profile, policy)?;

    let sanitized = format!("{token}{}", parsed.remainder);
    tracing::debug!("Sanitized command on {}: {}", profile.name(), sanitized);
    Ok(SanitizedCommand(sanitized))
}

fn requote(
    executable: &str,
    original: Option<QuoteStyle>,
    profile: &PlatformProfile,
) -> Result<String, GuardError> {
    let dialect = profile.dialect();
    let unsafe_executable = |found: &'static str| {
        let err = GuardError::UnsafeExecutable {
            executable: executable.to_string(),
            found,
            platform: profile.name(),
        };
        tracing::warn!("{}: {}", err.code(), err);
        err
    };

    if executable.trim().is_empty() {
        return Err(unsafe_executable("no executable name"));
    }
    if let Some(found) = guard::plain_violation(executable, dialect) {
        return Err(unsafe_executable(found));
    }

    let needs_quotes = executable.contains(char::is_whitespace)
        || (dialect == ShellDialect::Cmd && parser::has_env_reference(executable));

    Ok(match (needs_quotes, original) {
        (false, _) => executable.to_string(),
        (true, Some(QuoteStyle::Single)) => format!("'{executable}'"),
        (true, _) => format!("\"{executable}\""),
    })
}
