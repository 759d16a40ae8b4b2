//! Shell metacharacter detection.
//!
//! Two scanners share one metacharacter table:
//!
//! - [`assert_safe`] walks argument text the way the target shell would,
//!   tracking quote spans and escapes. Separators and redirections are literal
//!   inside quotes; substitution markers and control characters are not.
//! - [`plain_violation`] is used for text that must be a plain path or name
//!   (executables, search patterns). Nothing is exempt there, and quote
//!   characters themselves are rejected. On POSIX so is `\`, which would
//!   otherwise escape a quote added around the text later.
//!
//! Both run before any re-quoting, so the sanitizer's own quoting can never
//! hide a metacharacter from them.

use serde::{Deserialize, Serialize};

use crate::error::GuardError;
use crate::platform::{PlatformProfile, ShellDialect};

/// Treatment of `` ` `` and `$(` inside POSIX single quotes.
///
/// `sh` keeps them literal, but other shells and downstream re-evaluation do
/// not always agree, so the default rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SingleQuotes {
    #[default]
    Reject,
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GuardPolicy {
    pub single_quotes: SingleQuotes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    /// Separators, pipes, background and redirection: literal inside quotes.
    Structural,
    /// `` ` `` and `$(`: expanded inside double quotes.
    Substitution,
    /// Newline, carriage return, NUL: never acceptable.
    Control,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    None,
    Double,
    Single,
}

fn classify(c: char, next: Option<char>) -> Option<(Class, &'static str)> {
    let hit = match c {
        ';' => (Class::Structural, "command separator ';'"),
        '&' => (Class::Structural, "command separator '&'"),
        '|' => (Class::Structural, "pipe '|'"),
        '<' => (Class::Structural, "redirection '<'"),
        '>' => (Class::Structural, "redirection '>'"),
        '`' => (Class::Substitution, "command substitution '`'"),
        '$' if next == Some('(') => (Class::Substitution, "command substitution '$('"),
        '\n' => (Class::Control, "newline"),
        '\r' => (Class::Control, "carriage return"),
        '\0' => (Class::Control, "NUL byte"),
        _ => return None,
    };
    Some(hit)
}

/// Check command text for metacharacters outside recognized quote spans,
/// using the default [`GuardPolicy`].
pub fn assert_safe(text: &str, profile: &PlatformProfile) -> Result<(), GuardError> {
    assert_safe_with(text, profile, GuardPolicy::default())
}

pub fn assert_safe_with(
    text: &str,
    profile: &PlatformProfile,
    policy: GuardPolicy,
) -> Result<(), GuardError> {
    let err = match scan_quoted(text, profile.dialect(), policy) {
        Ok(()) => return Ok(()),
        Err(Some(found)) => GuardError::UnsafeCommand {
            fragment: text.to_string(),
            found,
            platform: profile.name(),
        },
        Err(None) => GuardError::MalformedCommand {
            command: text.to_string(),
            reason: "unterminated quote",
            platform: profile.name(),
        },
    };
    tracing::warn!("{}: {}", err.code(), err);
    Err(err)
}

/// First reason `text` cannot be used as a plain path or name, if any.
pub fn plain_violation(text: &str, dialect: ShellDialect) -> Option<&'static str> {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if let Some((_, found)) = classify(c, chars.peek().copied()) {
            return Some(found);
        }
        match c {
            '"' => return Some("double quote"),
            '\'' if dialect == ShellDialect::Posix => return Some("single quote"),
            '\\' if dialect == ShellDialect::Posix => return Some("backslash"),
            _ => {}
        }
    }
    None
}

/// `Err(Some(_))` names a metacharacter, `Err(None)` means a quote never closed.
fn scan_quoted(
    text: &str,
    dialect: ShellDialect,
    policy: GuardPolicy,
) -> Result<(), Option<&'static str>> {
    let chars: Vec<char> = text.chars().collect();
    let mut state = Quote::None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match state {
            Quote::None => {
                if escapes_outside_quotes(c, next, dialect) {
                    i += 2;
                    continue;
                }
                match c {
                    '"' => state = Quote::Double,
                    '\'' if dialect == ShellDialect::Posix => state = Quote::Single,
                    _ => {
                        if let Some((_, found)) = classify(c, next) {
                            return Err(Some(found));
                        }
                    }
                }
            }
            Quote::Double => {
                if c == '"' {
                    state = Quote::None;
                } else if dialect == ShellDialect::Posix
                    && c == '\\'
                    && matches!(next, Some('"') | Some('\\'))
                {
                    i += 2;
                    continue;
                } else if let Some((class, found)) = classify(c, next)
                    && class != Class::Structural
                {
                    return Err(Some(found));
                }
            }
            Quote::Single => {
                if c == '\'' {
                    state = Quote::None;
                } else if let Some((class, found)) = classify(c, next) {
                    match class {
                        Class::Control => return Err(Some(found)),
                        Class::Substitution if policy.single_quotes == SingleQuotes::Reject => {
                            return Err(Some(found));
                        }
                        _ => {}
                    }
                }
            }
        }
        i += 1;
    }

    if state == Quote::None {
        Ok(())
    } else {
        Err(None)
    }
}

/// An escaped quote (or escaped escape character) outside any quote span is
/// literal and must not open a span. Other escaped characters are still
/// inspected on the next step.
fn escapes_outside_quotes(c: char, next: Option<char>, dialect: ShellDialect) -> bool {
    match dialect {
        ShellDialect::Posix => c == '\\' && matches!(next, Some('"') | Some('\'') | Some('\\')),
        ShellDialect::Cmd => c == '^' && matches!(next, Some('"') | Some('^')),
    }
}
