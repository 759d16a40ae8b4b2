//! Native command lines for search and copy.
//!
//! Inputs are [`ValidatedPath`]s, so the allowlist decision has already been
//! made. Every path is still wrapped in double quotes, and characters that the
//! shell would interpret *inside* double quotes are refused, because passing
//! the allowlist says nothing about which characters a path contains.

use std::fmt;

use super::ShellLine;
use super::guard;
use crate::constants::MAX_SEARCH_DEPTH;
use crate::error::GuardError;
use crate::path_security::ValidatedPath;
use crate::platform::{PlatformProfile, ShellDialect};

/// A rendered command line. Only this module builds one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuiltCommand(String);

impl BuiltCommand {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for BuiltCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for BuiltCommand {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl ShellLine for BuiltCommand {
    fn as_shell_line(&self) -> &str {
        &self.0
    }
}

/// Build a name search rooted at `dir`.
///
/// `pattern` is a file-name glob and may not contain separators or
/// metacharacters. `max_depth` must not exceed [`MAX_SEARCH_DEPTH`]; `dir /s`
/// has no depth option, so on Windows it is checked but not rendered.
pub fn build_search_command(
    dir: &ValidatedPath,
    pattern: &str,
    max_depth: u32,
    profile: &PlatformProfile,
) -> Result<BuiltCommand, GuardError> {
    validate_pattern(pattern, profile)?;
    if max_depth > MAX_SEARCH_DEPTH {
        return Err(GuardError::DepthOutOfRange {
            depth: max_depth,
            max: MAX_SEARCH_DEPTH,
        });
    }

    let depth = max_depth.to_string();
    let command = match profile.dialect() {
        ShellDialect::Posix => render(
            profile.search_template(),
            &[
                ("dir", &quote_path(dir, profile)?),
                ("depth", &depth),
                ("pattern", &format!("\"{pattern}\"")),
            ],
        ),
        ShellDialect::Cmd => {
            let sep = profile.path_style().separator();
            let joined = if dir.as_str().ends_with(sep) {
                format!("{dir}{pattern}")
            } else {
                format!("{dir}{sep}{pattern}")
            };
            check_quotable(&joined, profile)?;
            render(
                profile.search_template(),
                &[("dir_pattern", &format!("\"{joined}\""))],
            )
        }
    };

    tracing::debug!("Built search command: {}", command);
    Ok(BuiltCommand(command))
}

/// Build a copy from `source` to `destination`, recursive when copying a
/// directory tree.
pub fn build_copy_command(
    source: &ValidatedPath,
    destination: &ValidatedPath,
    recursive: bool,
    profile: &PlatformProfile,
) -> Result<BuiltCommand, GuardError> {
    let templates = profile.copy_templates();
    let template = if recursive {
        templates.tree
    } else {
        templates.file
    };

    let command = render(
        template,
        &[
            ("source", &quote_path(source, profile)?),
            ("destination", &quote_path(destination, profile)?),
        ],
    );
    tracing::debug!("Built copy command: {}", command);
    Ok(BuiltCommand(command))
}

fn validate_pattern(pattern: &str, profile: &PlatformProfile) -> Result<(), GuardError> {
    let invalid = |reason: &'static str| GuardError::InvalidPattern {
        pattern: pattern.to_string(),
        reason,
    };

    if pattern.trim().is_empty() {
        return Err(invalid("pattern is empty"));
    }
    if pattern.contains(['/', '\\']) {
        return Err(invalid("pattern must not contain path separators"));
    }
    if let Some(found) = guard::plain_violation(pattern, profile.dialect()) {
        return Err(invalid(found));
    }
    Ok(())
}

/// Wrap a validated path in double quotes for the profile's shell.
fn quote_path(path: &ValidatedPath, profile: &PlatformProfile) -> Result<String, GuardError> {
    let text = path.as_str();
    check_quotable(text, profile)?;
    Ok(match profile.dialect() {
        // A trailing backslash would escape the closing quote for the
        // program's own argument parser.
        ShellDialect::Cmd if text.ends_with('\\') => format!("\"{text}\\\""),
        _ => format!("\"{text}\""),
    })
}

fn check_quotable(text: &str, profile: &PlatformProfile) -> Result<(), GuardError> {
    let found = text.chars().find_map(|c| match (c, profile.dialect()) {
        ('"', _) => Some("double quote"),
        ('\n', _) => Some("newline"),
        ('\r', _) => Some("carriage return"),
        ('\0', _) => Some("NUL byte"),
        ('`', ShellDialect::Posix) => Some("command substitution '`'"),
        ('$', ShellDialect::Posix) => Some("expansion '$'"),
        ('\\', ShellDialect::Posix) => Some("backslash"),
        _ => None,
    });

    match found {
        Some(found) => Err(GuardError::UnsafeCommand {
            fragment: text.to_string(),
            found,
            platform: profile.name(),
        }),
        None => Ok(()),
    }
}

/// Substitute `{name}` placeholders in one pass; substituted text is never
/// scanned again.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 64);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
