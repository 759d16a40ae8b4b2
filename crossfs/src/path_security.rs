//! Path allowlist validation.
//!
//! Every path that reaches the filesystem or a rendered command line passes
//! through [`validate_path`] first. The input is resolved against a base
//! directory and normalized lexically using the *profile's* path rules (not the
//! host's), then compared against the profile's allowed prefixes.
//!
//! ## Security
//! Normalization collapses `.` and `..` before the prefix comparison, so
//! `/tmp/../etc/passwd` is judged as `/etc/passwd`. Symlinks are **not**
//! resolved: a link inside an allowed directory that points elsewhere is still
//! accepted. Callers that need symlink containment must canonicalize on the host
//! and validate again.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use crate::error::GuardError;
use crate::platform::{PathStyle, PlatformProfile};

/// An absolute, normalized path that passed the allowlist of the profile it was
/// validated against. Only [`validate_path`] can build one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedPath {
    path: String,
}

impl ValidatedPath {
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Host view of the path, for filesystem calls and working directories.
    pub fn as_path(&self) -> &Path {
        Path::new(&self.path)
    }

    pub fn into_string(self) -> String {
        self.path
    }
}

impl fmt::Display for ValidatedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl AsRef<str> for ValidatedPath {
    fn as_ref(&self) -> &str {
        &self.path
    }
}

impl AsRef<Path> for ValidatedPath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

/// Resolve `input` against `base_dir` and check it against the profile's
/// allowlist.
///
/// Relative inputs are joined to `base_dir`, which must itself be absolute;
/// an empty input names `base_dir` itself. Input containing NUL is denied.
/// A path equal to an allowed prefix is accepted; trailing separators are
/// ignored on both sides of the comparison.
pub fn validate_path(
    input: &str,
    base_dir: &str,
    profile: &PlatformProfile,
) -> Result<ValidatedPath, GuardError> {
    let style = profile.path_style();
    let resolved = if input.contains('\0') {
        None
    } else {
        resolve(input, base_dir, style)
    };

    let Some(resolved) = resolved else {
        return Err(access_denied(input, input.replace('\0', "\\0"), profile));
    };

    if profile
        .allowed_prefixes()
        .iter()
        .any(|prefix| matches_prefix(&resolved, prefix, profile))
    {
        tracing::debug!("Path '{}' resolved to allowed '{}'", input, resolved);
        Ok(ValidatedPath { path: resolved })
    } else {
        Err(access_denied(input, resolved, profile))
    }
}

/// Normalize a path lexically under the given style without consulting the
/// filesystem. Returns `None` when neither `input` nor `base_dir` provides an
/// absolute anchor.
pub fn normalize_lexically(input: &str, base_dir: &str, style: PathStyle) -> Option<String> {
    resolve(input, base_dir, style)
}

fn access_denied(input: &str, resolved: String, profile: &PlatformProfile) -> GuardError {
    let err = GuardError::AccessDenied {
        input: input.replace('\0', "\\0"),
        resolved,
        platform: profile.name(),
        allowed: profile.allowed_prefixes().to_vec(),
    };
    tracing::warn!("{}: {}", err.code(), err);
    err
}

fn matches_prefix(resolved: &str, prefix: &str, profile: &PlatformProfile) -> bool {
    let style = profile.path_style();
    let Some(prefix) = resolve(prefix, "", style) else {
        return false;
    };

    let (path, prefix): (Cow<'_, str>, Cow<'_, str>) = if profile.is_case_sensitive() {
        (Cow::Borrowed(resolved), Cow::Owned(prefix))
    } else {
        (
            Cow::Owned(resolved.to_lowercase()),
            Cow::Owned(prefix.to_lowercase()),
        )
    };

    if path == prefix {
        return true;
    }
    if prefix.ends_with(style.separator()) {
        path.starts_with(&*prefix)
    } else {
        path.strip_prefix(&*prefix)
            .is_some_and(|tail| tail.starts_with(style.separator()))
    }
}

enum Anchor<'a> {
    Absolute { root: String, rest: &'a str },
    /// `\foo` on Windows: absolute on the base directory's drive.
    RootRelative { rest: &'a str },
    /// `C:foo` on Windows: relative to the base when it is on that drive.
    DriveRelative { drive: char, rest: &'a str },
    Relative { rest: &'a str },
}

fn anchor(path: &str, style: PathStyle) -> Anchor<'_> {
    match style {
        PathStyle::Posix => match path.strip_prefix('/') {
            Some(rest) => Anchor::Absolute {
                root: "/".to_string(),
                rest,
            },
            None => Anchor::Relative { rest: path },
        },
        PathStyle::Windows => windows_anchor(path),
    }
}

fn windows_anchor(path: &str) -> Anchor<'_> {
    let is_sep = |c: char| c == '\\' || c == '/';
    let mut chars = path.chars();
    match (chars.next(), chars.next()) {
        (Some(a), Some(b)) if is_sep(a) && is_sep(b) => {
            let mut pieces = path[2..].splitn(3, is_sep);
            let server = pieces.next().unwrap_or("");
            let share = pieces.next().unwrap_or("");
            let rest = pieces.next().unwrap_or("");
            let root = if share.is_empty() {
                format!("\\\\{server}\\")
            } else {
                format!("\\\\{server}\\{share}\\")
            };
            Anchor::Absolute { root, rest }
        }
        (Some(a), _) if is_sep(a) => Anchor::RootRelative { rest: &path[1..] },
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic() => {
            let drive = letter.to_ascii_uppercase();
            let rest = &path[2..];
            if rest.starts_with(is_sep) {
                Anchor::Absolute {
                    root: format!("{drive}:\\"),
                    rest: rest.trim_start_matches(is_sep),
                }
            } else {
                Anchor::DriveRelative { drive, rest }
            }
        }
        _ => Anchor::Relative { rest: path },
    }
}

fn resolve(input: &str, base_dir: &str, style: PathStyle) -> Option<String> {
    let mut parts = Vec::new();
    let root = match anchor(input, style) {
        Anchor::Absolute { root, rest } => {
            push_segments(&mut parts, rest, style);
            root
        }
        Anchor::Relative { rest } => {
            let root = base_anchor(base_dir, style, &mut parts)?;
            push_segments(&mut parts, rest, style);
            root
        }
        Anchor::RootRelative { rest } => {
            let root = base_anchor(base_dir, style, &mut Vec::new())?;
            push_segments(&mut parts, rest, style);
            root
        }
        Anchor::DriveRelative { drive, rest } => {
            let mut base_parts = Vec::new();
            let on_same_drive = base_anchor(base_dir, style, &mut base_parts)
                .filter(|root| root.starts_with(drive));
            let root = match on_same_drive {
                Some(root) => {
                    parts = base_parts;
                    root
                }
                None => format!("{drive}:\\"),
            };
            push_segments(&mut parts, rest, style);
            root
        }
    };

    let sep = style.separator().to_string();
    Some(format!("{root}{}", parts.join(&sep)))
}

fn base_anchor<'a>(base_dir: &'a str, style: PathStyle, parts: &mut Vec<&'a str>) -> Option<String> {
    match anchor(base_dir, style) {
        Anchor::Absolute { root, rest } => {
            push_segments(parts, rest, style);
            Some(root)
        }
        _ => None,
    }
}

fn push_segments<'a>(parts: &mut Vec<&'a str>, rest: &'a str, style: PathStyle) {
    for segment in rest.split(|c| style.is_separator(c)) {
        match classify_segment(segment, style) {
            Segment::Skip => {}
            Segment::Parent => {
                parts.pop();
            }
            Segment::Name => parts.push(segment),
        }
    }
}

enum Segment {
    Skip,
    Parent,
    Name,
}

fn classify_segment(segment: &str, style: PathStyle) -> Segment {
    // Win32 drops trailing spaces and dots, so "..  " walks up and "..." stays put.
    let trimmed = match style {
        PathStyle::Posix => segment,
        PathStyle::Windows => segment.trim_end_matches(' '),
    };
    match trimmed {
        "" | "." => Segment::Skip,
        ".." => Segment::Parent,
        dots if style == PathStyle::Windows && dots.chars().all(|c| c == '.') => Segment::Skip,
        _ => Segment::Name,
    }
}
