//! # crossfs
//!
//! Path allowlisting and shell command sanitization for agent-facing
//! filesystem and shell tools.
//!
//! Every request an agent makes that touches the filesystem or spawns a
//! process passes through this crate first. Paths are resolved lexically under
//! the active platform's rules and must land inside that platform's allowlist.
//! Command lines are split into an executable token and arguments, the token is
//! re-quoted canonically, and the arguments are scanned for shell
//! metacharacters that sit outside a quote span.
//!
//! ## Modules
//!
//! - **`platform`**: per-OS profiles (allowlist, case sensitivity, shell, native commands).
//! - **`path_security`**: `validate_path` and the `ValidatedPath` it produces.
//! - **`command`**: metacharacter guard, executable parser, sanitizer and command builder.
//! - **`exec`**: runs guarded command lines through the profile's shell with a timeout.
//! - **`config`**: optional TOML settings.
//! - **`shell`**: the `crossfs` binary.
//! - **`utils`**: logging setup.
//!
//! ## Example
//!
//! ```
//! use crossfs::{PlatformProfile, sanitize_command, validate_path};
//!
//! let linux = PlatformProfile::linux();
//! let path = validate_path("notes/today.md", "/home/me", &linux).unwrap();
//! assert_eq!(path.as_str(), "/home/me/notes/today.md");
//!
//! assert!(validate_path("../../root/.ssh/id_rsa", "/home/me", &linux).is_err());
//! assert!(sanitize_command("ls -la && whoami", &linux).is_err());
//! ```

pub mod command;
pub mod config;
pub mod constants;
pub mod error;
pub mod exec;
pub mod path_security;
pub mod platform;
pub mod shell;
pub mod utils;

pub use command::{
    BuiltCommand, GuardPolicy, SanitizedCommand, ShellLine, SingleQuotes, assert_safe,
    build_copy_command, build_search_command, ensure_safe_executable, parse_executable,
    sanitize_command, sanitize_command_with,
};
pub use error::GuardError;
pub use path_security::{ValidatedPath, validate_path};
pub use platform::{OsFamily, PlatformProfile};
