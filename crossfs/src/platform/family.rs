use serde::Serialize;

/// Operating system family. Every platform-dependent decision matches on this
/// exhaustively so a new family cannot silently inherit the wrong rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Posix,
    Windows,
    Other,
}

/// How a command interpreter treats quotes and escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellDialect {
    /// `sh -c`: single and double quotes, backslash escapes.
    Posix,
    /// `cmd.exe /C`: double quotes only, caret escapes.
    Cmd,
}

/// Separator and root conventions used for lexical path resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    Posix,
    Windows,
}

impl OsFamily {
    /// Classify an OS identifier as reported by `std::env::consts::OS`.
    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" | "macos" | "ios" | "android" | "freebsd" | "openbsd" | "netbsd"
            | "dragonfly" | "solaris" | "illumos" | "haiku" | "aix" => OsFamily::Posix,
            "windows" => OsFamily::Windows,
            _ if cfg!(unix) => OsFamily::Posix,
            _ => OsFamily::Other,
        }
    }

    /// Family of the running host.
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn dialect(self) -> ShellDialect {
        match self {
            OsFamily::Windows => ShellDialect::Cmd,
            OsFamily::Posix | OsFamily::Other => ShellDialect::Posix,
        }
    }

    pub fn path_style(self) -> PathStyle {
        match self {
            OsFamily::Windows => PathStyle::Windows,
            OsFamily::Posix | OsFamily::Other => PathStyle::Posix,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OsFamily::Posix => "posix",
            OsFamily::Windows => "windows",
            OsFamily::Other => "other",
        }
    }
}

impl std::fmt::Display for OsFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PathStyle {
    pub fn separator(self) -> char {
        match self {
            PathStyle::Posix => '/',
            PathStyle::Windows => '\\',
        }
    }

    pub fn is_separator(self, c: char) -> bool {
        match self {
            PathStyle::Posix => c == '/',
            PathStyle::Windows => c == '\\' || c == '/',
        }
    }
}
