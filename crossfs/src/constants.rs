//! # Shared Constants
//!
//! Limits and defaults shared by the command builder, the process runner and the
//! CLI. Keeping them here lets the settings file and the CLI fall back to the same
//! values the library enforces.

/// Search depth used when the caller does not ask for one.
pub const DEFAULT_SEARCH_DEPTH: u32 = 3;

/// Upper bound accepted for `maxdepth` in rendered search commands.
pub const MAX_SEARCH_DEPTH: u32 = 32;

/// Default wall-clock limit for a spawned shell command, in seconds.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 120;

/// Extensions that terminate a `%VAR%`-prefixed executable token on Windows.
pub const WINDOWS_EXECUTABLE_EXTENSIONS: &[&str] = &[".exe", ".com", ".bat", ".cmd"];

/// Name of the optional settings file inside the user config directory.
pub const SETTINGS_FILE_NAME: &str = "crossfs.toml";
