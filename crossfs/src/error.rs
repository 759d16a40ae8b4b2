//! Error taxonomy for path validation and command sanitization.
//!
//! Every variant describes a defect in caller input, never a transient
//! condition, so none of them is retried. Each one carries enough context
//! (the offending fragment, the platform, and for `AccessDenied` the whole
//! allowlist) for the caller to correct the request without probing the
//! filesystem.

/// Errors produced by the guard layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error(
        "Access denied: path '{resolved}' (from '{input}') is outside the allowed directories on {platform}. Allowed: {}",
        .allowed.join(", ")
    )]
    AccessDenied {
        input: String,
        resolved: String,
        platform: &'static str,
        allowed: Vec<String>,
    },

    #[error("Unsafe executable '{executable}' on {platform}: contains {found}")]
    UnsafeExecutable {
        executable: String,
        found: &'static str,
        platform: &'static str,
    },

    #[error("Unsafe command '{fragment}' on {platform}: contains {found}")]
    UnsafeCommand {
        fragment: String,
        found: &'static str,
        platform: &'static str,
    },

    #[error("Malformed command '{command}' on {platform}: {reason}")]
    MalformedCommand {
        command: String,
        reason: &'static str,
        platform: &'static str,
    },

    #[error("Invalid search pattern '{pattern}': {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },

    #[error("Search depth {depth} exceeds the maximum of {max}")]
    DepthOutOfRange { depth: u32, max: u32 },
}

impl GuardError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccessDenied { .. } => "ACCESS_DENIED",
            Self::UnsafeExecutable { .. } => "UNSAFE_EXECUTABLE",
            Self::UnsafeCommand { .. } => "UNSAFE_COMMAND",
            Self::MalformedCommand { .. } => "MALFORMED_COMMAND",
            Self::InvalidPattern { .. } => "INVALID_PATTERN",
            Self::DepthOutOfRange { .. } => "DEPTH_OUT_OF_RANGE",
        }
    }
}
