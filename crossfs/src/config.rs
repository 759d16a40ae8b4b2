//! # Settings
//!
//! Optional TOML settings for the `crossfs` binary and for embedders that want
//! the same defaults. Settings tune behavior around the guards (log level,
//! timeouts, search depth, quote policy, base directory); they never widen a
//! platform's allowlist.
//!
//! Lookup order for [`Settings::load`]: an explicit path, then the
//! `CROSSFS_CONFIG` environment variable, then `crossfs.toml` in the user
//! config directory. A missing default file yields [`Settings::default`]; a
//! missing explicit file is an error.

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::command::{GuardPolicy, SingleQuotes};
use crate::constants::{
    DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_SEARCH_DEPTH, MAX_SEARCH_DEPTH, SETTINGS_FILE_NAME,
};

/// Environment variable naming a settings file.
pub const CONFIG_ENV_VAR: &str = "CROSSFS_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Default `tracing` level when `RUST_LOG` is unset.
    pub log_level: String,
    pub command_timeout_secs: u64,
    pub default_search_depth: u32,
    /// How `` ` `` and `$(` inside POSIX single quotes are treated.
    pub single_quote_policy: SingleQuotes,
    /// Base directory for relative paths. Defaults to the home directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            default_search_depth: DEFAULT_SEARCH_DEPTH,
            single_quote_policy: SingleQuotes::default(),
            base_dir: None,
        }
    }
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text).context("Failed to parse settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid settings file {}", path.display()))
    }

    /// `crossfs.toml` in the platform's user config directory, if one exists.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "CrossFs", "crossfs")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE_NAME))
    }

    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
            return Self::load_from_file(Path::new(&path));
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.command_timeout_secs == 0 {
            bail!("command_timeout_secs must be greater than zero");
        }
        if self.default_search_depth > MAX_SEARCH_DEPTH {
            bail!(
                "default_search_depth {} exceeds the maximum of {}",
                self.default_search_depth,
                MAX_SEARCH_DEPTH
            );
        }
        if self.log_level.trim().is_empty() {
            bail!("log_level must not be empty");
        }
        Ok(())
    }

    pub fn guard_policy(&self) -> GuardPolicy {
        GuardPolicy {
            single_quotes: self.single_quote_policy,
        }
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Configured base directory, else the home directory.
    pub fn resolved_base_dir(&self) -> Option<String> {
        self.base_dir.clone().or_else(|| {
            dirs::home_dir().map(|home| home.to_string_lossy().into_owned())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            command_timeout_secs = 5
            single_quote_policy = "literal"
            "#,
        )
        .unwrap();
        assert_eq!(settings.command_timeout(), Duration::from_secs(5));
        assert_eq!(settings.guard_policy().single_quotes, SingleQuotes::Literal);
        assert_eq!(settings.default_search_depth, DEFAULT_SEARCH_DEPTH);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::from_toml_str("allowed_prefixes = [\"/\"]").is_err());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(Settings::from_toml_str("command_timeout_secs = 0").is_err());
        assert!(Settings::from_toml_str("default_search_depth = 33").is_err());
        assert!(Settings::from_toml_str("single_quote_policy = \"maybe\"").is_err());
    }

    #[test]
    fn explicit_base_dir_wins() {
        let settings = Settings {
            base_dir: Some("/tmp/work".to_string()),
            ..Settings::default()
        };
        assert_eq!(settings.resolved_base_dir().as_deref(), Some("/tmp/work"));
    }
}
