use serde::Serialize;
use std::sync::OnceLock;

use super::family::{OsFamily, PathStyle, ShellDialect};

/// Interpreter and "run this string" flag used to execute command lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShellInvocation {
    pub interpreter: &'static str,
    pub flag: &'static str,
}

/// Copy command templates. `file` copies one file, `tree` copies a directory
/// recursively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CopyTemplates {
    pub file: &'static str,
    pub tree: &'static str,
}

const POSIX_SHELL: ShellInvocation = ShellInvocation {
    interpreter: "/bin/sh",
    flag: "-c",
};

const POSIX_COPY: CopyTemplates = CopyTemplates {
    file: "cp {source} {destination}",
    tree: "cp -R {source} {destination}",
};

const POSIX_SEARCH: &str = "find {dir} -maxdepth {depth} -name {pattern} -type f";

/// Static per-platform data consulted by every validation.
///
/// Built once per process (see [`PlatformProfile::current`]) and passed by
/// reference everywhere else; nothing mutates it after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformProfile {
    name: &'static str,
    family: OsFamily,
    allowed_prefixes: Vec<String>,
    case_sensitive: bool,
    shell: ShellInvocation,
    copy: CopyTemplates,
    search_template: &'static str,
}

impl PlatformProfile {
    /// Linux, the BSDs and any Unix without a dedicated profile.
    pub fn linux() -> Self {
        Self {
            name: "linux",
            family: OsFamily::Posix,
            allowed_prefixes: owned(&["/home/", "/tmp/", "/var/tmp/", "/opt/", "/usr/local/", "/etc/"]),
            case_sensitive: true,
            shell: POSIX_SHELL,
            copy: POSIX_COPY,
            search_template: POSIX_SEARCH,
        }
    }

    pub fn macos() -> Self {
        Self {
            name: "macos",
            family: OsFamily::Posix,
            allowed_prefixes: owned(&["/Users/", "/tmp/", "/var/tmp/", "/opt/homebrew/", "/usr/local/"]),
            case_sensitive: true,
            shell: POSIX_SHELL,
            copy: POSIX_COPY,
            search_template: POSIX_SEARCH,
        }
    }

    pub fn windows() -> Self {
        Self {
            name: "windows",
            family: OsFamily::Windows,
            allowed_prefixes: owned(&["C:\\Users\\", "C:\\temp\\", "C:\\tmp\\", "D:\\"]),
            case_sensitive: false,
            shell: ShellInvocation {
                interpreter: "cmd.exe",
                flag: "/C",
            },
            copy: CopyTemplates {
                file: "copy {source} {destination}",
                tree: "xcopy {source} {destination} /E /I /Y",
            },
            search_template: "dir {dir_pattern} /s /b",
        }
    }

    /// Minimal fallback for an unrecognized OS: the home directory and `/tmp/`.
    pub fn other(home: impl Into<String>) -> Self {
        Self {
            name: "other",
            family: OsFamily::Other,
            allowed_prefixes: vec![home.into(), "/tmp/".to_string()],
            case_sensitive: true,
            shell: POSIX_SHELL,
            copy: POSIX_COPY,
            search_template: POSIX_SEARCH,
        }
    }

    /// Select the profile for an OS identifier (`std::env::consts::OS` values).
    ///
    /// `home` is only consulted by the fallback profile.
    pub fn for_os(os: &str, home: &str) -> Self {
        match OsFamily::from_os(os) {
            OsFamily::Posix if os == "macos" => Self::macos(),
            OsFamily::Posix => Self::linux(),
            OsFamily::Windows => Self::windows(),
            OsFamily::Other => Self::other(home),
        }
    }

    /// Look up a profile by its name, as accepted by `--platform`.
    pub fn by_name(name: &str, home: &str) -> Option<Self> {
        match name {
            "linux" | "posix" => Some(Self::linux()),
            "macos" => Some(Self::macos()),
            "windows" => Some(Self::windows()),
            "other" => Some(Self::other(home)),
            _ => None,
        }
    }

    /// The host's profile, detected on first use.
    pub fn current() -> &'static PlatformProfile {
        static CURRENT: OnceLock<PlatformProfile> = OnceLock::new();
        CURRENT.get_or_init(|| {
            let home = dirs::home_dir()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_else(|| ".".to_string());
            let profile = Self::for_os(std::env::consts::OS, &home);
            tracing::debug!(
                "Selected platform profile '{}' ({}) with {} allowed prefixes",
                profile.name,
                profile.family,
                profile.allowed_prefixes.len()
            );
            profile
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn family(&self) -> OsFamily {
        self.family
    }

    pub fn allowed_prefixes(&self) -> &[String] {
        &self.allowed_prefixes
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn shell(&self) -> ShellInvocation {
        self.shell
    }

    pub fn copy_templates(&self) -> CopyTemplates {
        self.copy
    }

    pub fn search_template(&self) -> &'static str {
        self.search_template
    }

    pub fn dialect(&self) -> ShellDialect {
        self.family.dialect()
    }

    pub fn path_style(&self) -> PathStyle {
        self.family.path_style()
    }
}

fn owned(prefixes: &[&str]) -> Vec<String> {
    prefixes.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_os_picks_dedicated_profiles() {
        assert_eq!(PlatformProfile::for_os("macos", "/Users/me").name(), "macos");
        assert_eq!(PlatformProfile::for_os("linux", "/home/me").name(), "linux");
        assert_eq!(PlatformProfile::for_os("freebsd", "/home/me").name(), "linux");
        assert_eq!(PlatformProfile::for_os("windows", "C:\\Users\\me").name(), "windows");
    }

    #[test]
    fn windows_profile_is_case_insensitive_with_cmd_shell() {
        let profile = PlatformProfile::windows();
        assert!(!profile.is_case_sensitive());
        assert_eq!(profile.shell().interpreter, "cmd.exe");
        assert_eq!(profile.shell().flag, "/C");
        assert_eq!(profile.dialect(), ShellDialect::Cmd);
        assert!(profile.allowed_prefixes().iter().any(|p| p == "D:\\"));
    }

    #[test]
    fn windows_tree_copy_differs_from_file_copy() {
        let copy = PlatformProfile::windows().copy_templates();
        assert!(copy.file.starts_with("copy "));
        assert!(copy.tree.starts_with("xcopy "));
    }

    #[test]
    fn fallback_profile_allows_home_and_tmp_only() {
        let profile = PlatformProfile::other("/home/agent");
        assert_eq!(profile.family(), OsFamily::Other);
        assert_eq!(profile.allowed_prefixes(), ["/home/agent", "/tmp/"]);
        assert!(profile.is_case_sensitive());
        assert_eq!(profile.shell().flag, "-c");
    }

    #[test]
    fn by_name_rejects_unknown_platforms() {
        assert!(PlatformProfile::by_name("beos", "/").is_none());
        assert_eq!(PlatformProfile::by_name("posix", "/").map(|p| p.name()), Some("linux"));
    }

    #[test]
    fn current_profile_matches_host_family() {
        assert_eq!(PlatformProfile::current().family(), OsFamily::detect());
    }
}
