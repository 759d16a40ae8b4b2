//! # crossfs CLI
//!
//! Command-line interface definition and main entry point.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::ExitCode, time::Duration};

use super::report::{PlatformReport, Report};
use crate::command::{
    build_copy_command, build_search_command, ensure_safe_executable, sanitize_command_with,
};
use crate::config::Settings;
use crate::error::GuardError;
use crate::exec::ShellRunner;
use crate::path_security::validate_path;
use crate::platform::PlatformProfile;
use crate::utils::logging::init_logging;

/// Exit status for a request refused by a guard.
pub const GUARD_FAILURE_EXIT: u8 = 2;

/// crossfs: validate paths and sanitize shell commands for agent filesystem tools.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about,
    long_about = "crossfs checks paths against a per-platform allowlist and sanitizes shell
command lines before they run.

Examples:
  crossfs validate ../notes.txt --base-dir /home/me/project
  crossfs sanitize '\"/usr/local/My Tool/bin/tool\" --version'
  crossfs search /tmp/work '*.rs' --max-depth 2 --run
  crossfs --platform windows copy 'C:\\temp\\src dir' 'C:\\temp\\dst dir' --recursive

Guard failures exit with status 2."
)]
pub struct Cli {
    /// Platform profile to validate against: linux, macos, windows or other.
    /// Defaults to the host's profile.
    #[arg(long, global = true)]
    pub platform: Option<String>,

    /// Base directory for relative paths (defaults to the settings file, then home)
    #[arg(long, global = true)]
    pub base_dir: Option<String>,

    /// Path to a crossfs.toml settings file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Log to stderr instead of file
    #[arg(long, global = true)]
    pub log_to_stderr: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the active profile and host details
    Platform,

    /// Resolve a path and check it against the allowlist
    Validate { path: String },

    /// Validate a bare executable path and print it canonically quoted
    Executable {
        #[arg(allow_hyphen_values = true)]
        path: String,
    },

    /// Sanitize a full command line
    Sanitize {
        #[arg(allow_hyphen_values = true)]
        command: String,
    },

    /// Build a file-name search rooted at DIR
    Search {
        dir: String,
        pattern: String,
        /// Maximum directory depth (defaults to the settings value)
        #[arg(long)]
        max_depth: Option<u32>,
        /// Run the command instead of printing it
        #[arg(long)]
        run: bool,
    },

    /// Build a copy from SOURCE to DESTINATION
    Copy {
        source: String,
        destination: String,
        /// Copy a directory tree. Implied when SOURCE is an existing directory.
        #[arg(long)]
        recursive: bool,
        /// Run the command instead of printing it
        #[arg(long)]
        run: bool,
    },

    /// Sanitize a command line and run it
    Exec {
        #[arg(allow_hyphen_values = true)]
        command: String,
        /// Working directory (defaults to the base directory)
        #[arg(long)]
        cwd: Option<String>,
        /// Timeout in seconds (defaults to the settings value)
        #[arg(long)]
        timeout: Option<u64>,
    },
}

pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    let log_level = if cli.debug {
        "debug"
    } else {
        settings.log_level.as_str()
    };
    let log_to_file = !(cli.log_to_stderr || env_flag_enabled("CROSSFS_LOG_TO_STDERR"));
    init_logging(log_level, log_to_file)?;

    let format = cli.format;
    match dispatch(cli, &settings).await {
        Ok(report) => {
            match format {
                OutputFormat::Text => println!("{}", report.to_text()),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
            Ok(ExitCode::from(report.exit_status()))
        }
        Err(e) => match e.downcast_ref::<GuardError>() {
            Some(guard) => {
                match format {
                    OutputFormat::Text => eprintln!("{} ({})", guard, guard.code()),
                    OutputFormat::Json => println!(
                        "{}",
                        serde_json::json!({ "error": guard.to_string(), "code": guard.code() })
                    ),
                }
                Ok(ExitCode::from(GUARD_FAILURE_EXIT))
            }
            None => Err(e),
        },
    }
}

/// Execute one parsed invocation. Guard failures come back as a [`GuardError`]
/// inside the `anyhow::Error`.
pub async fn dispatch(cli: Cli, settings: &Settings) -> Result<Report> {
    let home = dirs::home_dir()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    let profile = match cli.platform.as_deref() {
        Some(name) => PlatformProfile::by_name(name, &home)
            .ok_or_else(|| {
                anyhow!("Unknown platform '{name}' (expected linux, macos, windows or other)")
            })?,
        None => PlatformProfile::current().clone(),
    };
    let base_dir = cli.base_dir.clone().or_else(|| settings.resolved_base_dir());
    let base_ref = base_dir.as_deref();
    let base = move || {
        base_ref.context("No base directory: pass --base-dir or set base_dir in the settings file")
    };

    tracing::debug!("Dispatching {:?} with profile '{}'", cli.command, profile.name());

    let report = match cli.command {
        Command::Platform => Report::Platform(PlatformReport::new(&profile, base_dir.clone())),
        Command::Validate { path } => {
            let validated = validate_path(&path, base()?, &profile)?;
            Report::Path {
                input: path,
                path: validated.into_string(),
            }
        }
        Command::Executable { path } => {
            let executable = ensure_safe_executable(&path, &profile)?;
            Report::Executable {
                input: path,
                executable,
            }
        }
        Command::Sanitize { command } => {
            let sanitized = sanitize_command_with(&command, &profile, settings.guard_policy())?;
            Report::Command {
                command: sanitized.into_string(),
            }
        }
        Command::Search {
            dir,
            pattern,
            max_depth,
            run,
        } => {
            let dir = validate_path(&dir, base()?, &profile)?;
            let depth = max_depth.unwrap_or(settings.default_search_depth);
            let built = build_search_command(&dir, &pattern, depth, &profile)?;
            if run {
                let runner = ShellRunner::new(&profile).with_timeout(settings.command_timeout());
                let output = runner.run(&built, Some(&dir)).await?;
                Report::Executed {
                    command: built.into_string(),
                    output,
                }
            } else {
                Report::Command {
                    command: built.into_string(),
                }
            }
        }
        Command::Copy {
            source,
            destination,
            recursive,
            run,
        } => {
            let source = validate_path(&source, base()?, &profile)?;
            let destination = validate_path(&destination, base()?, &profile)?;
            let recursive = recursive || source.as_path().is_dir();
            let built = build_copy_command(&source, &destination, recursive, &profile)?;
            if run {
                let runner = ShellRunner::new(&profile).with_timeout(settings.command_timeout());
                let output = runner.run(&built, None).await?;
                Report::Executed {
                    command: built.into_string(),
                    output,
                }
            } else {
                Report::Command {
                    command: built.into_string(),
                }
            }
        }
        Command::Exec {
            command,
            cwd,
            timeout,
        } => {
            let sanitized = sanitize_command_with(&command, &profile, settings.guard_policy())?;
            let cwd = validate_path(cwd.as_deref().unwrap_or("."), base()?, &profile)?;
            let timeout = timeout
                .map(Duration::from_secs)
                .unwrap_or_else(|| settings.command_timeout());
            let output = ShellRunner::new(&profile)
                .with_timeout(timeout)
                .run(&sanitized, Some(&cwd))
                .await?;
            Report::Executed {
                command: sanitized.into_string(),
                output,
            }
        }
    };

    Ok(report)
}

fn env_flag_enabled(name: &str) -> bool {
    std::env::var(name)
        .map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("crossfs").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = parse(&["validate", "x", "--platform", "windows", "--format", "json"]);
        assert_eq!(cli.platform.as_deref(), Some("windows"));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn sanitize_accepts_hyphenated_command() {
        let cli = parse(&["sanitize", "-rf"]);
        assert!(matches!(cli.command, Command::Sanitize { ref command } if command == "-rf"));
    }

    #[tokio::test]
    async fn guard_failures_downcast_to_guard_error() {
        let cli = parse(&["--platform", "linux", "sanitize", "ls; id"]);
        let err = dispatch(cli, &Settings::default()).await.unwrap_err();
        let guard = err.downcast_ref::<GuardError>().unwrap();
        assert_eq!(guard.code(), "UNSAFE_COMMAND");
    }

    #[tokio::test]
    async fn unknown_platform_is_a_plain_error() {
        let cli = parse(&["--platform", "beos", "platform"]);
        let err = dispatch(cli, &Settings::default()).await.unwrap_err();
        assert!(err.downcast_ref::<GuardError>().is_none());
    }

    #[tokio::test]
    async fn search_uses_settings_depth() {
        let settings = Settings {
            default_search_depth: 5,
            ..Settings::default()
        };
        let cli = parse(&["--platform", "linux", "--base-dir", "/tmp", "search", "work", "*.rs"]);
        let report = dispatch(cli, &settings).await.unwrap();
        assert_eq!(
            report.to_text(),
            "find \"/tmp/work\" -maxdepth 5 -name \"*.rs\" -type f"
        );
    }

    #[test]
    fn env_flag_parsing_is_lenient() {
        assert!(!env_flag_enabled("CROSSFS_TEST_FLAG_THAT_IS_NEVER_SET"));
    }
}
