use serde::Serialize;
use std::fmt::Write as _;

use crate::exec::CommandOutput;
use crate::platform::{OsFamily, PlatformProfile, ShellInvocation};

/// Host and profile details printed by `crossfs platform`.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformReport {
    pub profile: &'static str,
    pub family: OsFamily,
    pub case_sensitive: bool,
    pub allowed_prefixes: Vec<String>,
    pub shell: ShellInvocation,
    pub home_dir: Option<String>,
    pub current_dir: Option<String>,
    pub base_dir: Option<String>,
    pub arch: &'static str,
}

impl PlatformReport {
    pub fn new(profile: &PlatformProfile, base_dir: Option<String>) -> Self {
        Self {
            profile: profile.name(),
            family: profile.family(),
            case_sensitive: profile.is_case_sensitive(),
            allowed_prefixes: profile.allowed_prefixes().to_vec(),
            shell: profile.shell(),
            home_dir: dirs::home_dir().map(|p| p.to_string_lossy().into_owned()),
            current_dir: std::env::current_dir()
                .ok()
                .map(|p| p.to_string_lossy().into_owned()),
            base_dir,
            arch: std::env::consts::ARCH,
        }
    }
}

/// Outcome of one subcommand.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Platform(PlatformReport),
    Path { input: String, path: String },
    Executable { input: String, executable: String },
    /// A sanitized or built command line that was not run.
    Command { command: String },
    Executed {
        command: String,
        #[serde(flatten)]
        output: CommandOutput,
    },
}

impl Report {
    /// Exit status for the process: the child's status for `Executed`.
    pub fn exit_status(&self) -> u8 {
        match self {
            Report::Executed { output, .. } => match output.exit_code {
                Some(code) => u8::try_from(code).unwrap_or(1),
                None => 1,
            },
            _ => 0,
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Report::Platform(info) => {
                let mut out = String::new();
                let _ = writeln!(out, "profile: {} ({})", info.profile, info.family);
                let _ = writeln!(out, "case sensitive: {}", info.case_sensitive);
                let _ = writeln!(out, "shell: {} {}", info.shell.interpreter, info.shell.flag);
                let _ = writeln!(out, "arch: {}", info.arch);
                for (label, value) in [
                    ("home", &info.home_dir),
                    ("current directory", &info.current_dir),
                    ("base directory", &info.base_dir),
                ] {
                    let _ = writeln!(out, "{label}: {}", value.as_deref().unwrap_or("(unknown)"));
                }
                out.push_str("allowed prefixes:");
                for prefix in &info.allowed_prefixes {
                    let _ = write!(out, "\n  {prefix}");
                }
                out
            }
            Report::Path { path, .. } => path.clone(),
            Report::Executable { executable, .. } => executable.clone(),
            Report::Command { command } => command.clone(),
            Report::Executed { output, .. } => {
                let mut out = output.stdout.clone();
                if !output.stderr.is_empty() {
                    if !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    out.push_str(&output.stderr);
                }
                out.trim_end_matches('\n').to_string()
            }
        }
    }
}
