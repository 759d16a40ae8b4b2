//! # Logging
//!
//! One global `tracing` subscriber per process, installed by [`init_logging`].
//!
//! - Verbosity comes from `RUST_LOG` when set; otherwise the requested level
//!   applies to dependencies and `crossfs` itself logs at `debug`.
//! - By default records go to a daily rolling file, `crossfs.log`, in the
//!   user cache directory. ANSI colors are off there.
//! - With `log_to_file = false`, or when the cache directory is missing or not
//!   writable, records go to stderr with colors.
//!
//! Library code only emits events. Guard rejections are logged at `warn`,
//! accepted paths and rendered commands at `debug`.

use anyhow::Result;
use directories::ProjectDirs;
use std::{io::stderr, path::Path, sync::Once};
use tracing_subscriber::{EnvFilter, fmt::layer, prelude::*};

static INIT: Once = Once::new();

/// Trace-level stderr logging for tests. Safe to call from every test.
pub fn init_test_logging() {
    let _ = init_logging("trace", false);
}

/// Install the global subscriber. Later calls are no-ops.
///
/// # Errors
///
/// Currently infallible; the `Result` leaves room for sinks that can fail.
pub fn init_logging(log_level: &str, log_to_file: bool) -> Result<()> {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{log_level},crossfs=debug")));

        if log_to_file
            && let Some(dirs) = ProjectDirs::from("com", "CrossFs", "crossfs")
            && writable(dirs.cache_dir())
        {
            // rolling::daily panics when it cannot open the file, so the
            // directory is probed first and the panic is still contained.
            let appender = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                tracing_appender::rolling::daily(dirs.cache_dir(), "crossfs.log")
            }));
            if let Ok(appender) = appender {
                let (writer, guard) = tracing_appender::non_blocking(appender);
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(layer().with_writer(writer).with_ansi(false))
                    .init();
                // Flushes on drop; the process owns it until exit.
                Box::leak(Box::new(guard));
                return;
            }
        }

        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer().with_writer(stderr).with_ansi(true))
            .init();
    });

    Ok(())
}

fn writable(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let probe = dir.join(".crossfs_log_probe");
    let ok = std::fs::write(&probe, b"probe").is_ok();
    let _ = std::fs::remove_file(&probe);
    ok
}
