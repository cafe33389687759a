use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize logging with human-readable output format.
///
/// Uses the `RUST_LOG` environment variable if set, otherwise falls back
/// to `default_level` (e.g. "info", "debug", "lb_client=debug,warn").
///
/// Safe to call multiple times (e.g. in tests) -- subsequent calls are no-ops.
pub fn init_logging(service_name: &str, default_level: &str) {
    fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .try_init()
        .ok();

    tracing::info!(service = service_name, "logging initialised (human-readable)");
}

/// Initialize logging with JSON output format.
///
/// Safe to call multiple times -- subsequent calls are no-ops.
pub fn init_logging_json(service_name: &str, default_level: &str) {
    fmt()
        .json()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .try_init()
        .ok();

    tracing::info!(service = service_name, "logging initialised (json)");
}

/// Pick the format from the `[logging] json` setting.
pub fn init(service_name: &str, default_level: &str, json: bool) {
    if json {
        init_logging_json(service_name, default_level);
    } else {
        init_logging(service_name, default_level);
    }
}

/// Open (or create) the log file, creating missing parent directories.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// The file at `path`, or a sink when it cannot be opened. Never stderr:
/// the caller owns the terminal.
fn file_writer(path: &Path) -> (BoxMakeWriter, io::Result<()>) {
    match open_log_file(path) {
        Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), Ok(())),
        Err(err) => (BoxMakeWriter::new(io::sink), Err(err)),
    }
}

/// Log into a file instead of stderr. The TUI owns the terminal, so it
/// logs here.
///
/// When the file cannot be opened, log lines are discarded and the open
/// error is returned for the caller to report.
pub fn init_logging_to_file(service_name: &str, default_level: &str, path: &Path) -> io::Result<()> {
    let (writer, opened) = file_writer(path);
    fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .try_init()
        .ok();

    if opened.is_ok() {
        tracing::info!(service = service_name, path = %path.display(), "logging initialised (file)");
    }
    opened
}
