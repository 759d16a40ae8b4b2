//! # Platform Profiles
//!
//! Static, per-OS data that every other module consults: the directory
//! allowlist, whether path comparison is case-sensitive, how the shell is
//! invoked and which native commands implement copy and search.
//!
//! A profile is selected once from the detected OS family and is read-only
//! afterwards. Functions elsewhere in the crate take `&PlatformProfile` as a
//! parameter instead of reading it from ambient state, so tests can exercise the
//! Windows rules on a Unix host and vice versa.

mod family;
mod profile;

pub use family::{OsFamily, PathStyle, ShellDialect};
pub use profile::{CopyTemplates, PlatformProfile, ShellInvocation};
