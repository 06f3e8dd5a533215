use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Keeps buffered log writers alive; drop it last.
#[derive(Default)]
pub struct LogGuard {
    #[cfg(feature = "debug-log")]
    _file: Option<tracing_appender::non_blocking::WorkerGuard>,
}

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "warn,switchboard=debug" } else { "warn" })
    })
}

/// Installs the global subscriber: `RUST_LOG` when set, else `warn`
/// (`debug` for this crate with `verbose`), written to stderr.
#[cfg(not(feature = "debug-log"))]
pub fn init(verbose: bool) -> LogGuard {
    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if tracing_subscriber::registry()
        .with(filter(verbose))
        .with(stderr)
        .try_init()
        .is_err()
    {
        eprintln!("Failed to set tracing subscriber");
    }
    LogGuard::default()
}

#[cfg(not(feature = "debug-log"))]
#[must_use]
pub const fn log_file_path() -> Option<&'static std::path::PathBuf> {
    None
}

#[cfg(feature = "debug-log")]
mod file {
    use std::fs;
    use std::path::PathBuf;
    use std::sync::OnceLock;
    use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

    pub static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

    pub fn open() -> Option<(NonBlocking, WorkerGuard)> {
        let log_path = PathBuf::from("switchboard-debug.log");
        let file = match fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
        {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Failed to open log file: {e}");
                return None;
            }
        };
        LOG_PATH.set(log_path).ok();
        Some(tracing_appender::non_blocking(file))
    }
}

/// Same as the plain build plus a JSON layer appended to
/// `switchboard-debug.log`.
#[cfg(feature = "debug-log")]
pub fn init(verbose: bool) -> LogGuard {
    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let (writer, guard) = file::open().unzip();
    let json = writer.map(|w| {
        fmt::layer()
            .json()
            .with_writer(w)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
    });

    if tracing_subscriber::registry()
        .with(filter(verbose))
        .with(stderr)
        .with(json)
        .try_init()
        .is_err()
    {
        eprintln!("Failed to set tracing subscriber");
    }
    tracing::debug!("Debug logging initialized");
    LogGuard { _file: guard }
}

#[cfg(feature = "debug-log")]
#[must_use]
pub fn log_file_path() -> Option<&'static std::path::PathBuf> {
    file::LOG_PATH.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_filter_enables_crate_debug() {
        let quiet = filter(false).to_string();
        let loud = filter(true).to_string();
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(quiet, "warn");
            assert!(loud.contains("switchboard=debug"));
        }
    }
}
