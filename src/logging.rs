//! Smart-Todo Logging System
//!
//! Structured logging through `tracing`. CLI output goes to stderr so that
//! command results on stdout stay machine-readable; the API server can log
//! to a daily-rotated file instead.

use std::io;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Logging configuration options
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to output
    pub level: Level,
    /// Enable colored output
    pub color: bool,
    /// Show timestamps
    pub show_timestamps: bool,
    /// Show target/module name
    pub show_target: bool,
    /// Enable JSON format for machine parsing
    pub json_format: bool,
    /// Write to a daily-rotated file instead of stderr
    pub file_output: Option<PathBuf>,
}

/// Application modes with different logging requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationMode {
    /// One-shot commands - terse, warnings and up unless asked
    Cli,
    /// Long-running API server
    Server,
}

impl LoggingConfig {
    pub fn for_mode(mode: ApplicationMode) -> Self {
        match mode {
            ApplicationMode::Cli => Self {
                level: Level::WARN,
                color: true,
                show_timestamps: false,
                show_target: false,
                json_format: false,
                file_output: None,
            },
            ApplicationMode::Server => Self {
                level: Level::INFO,
                color: false,
                show_timestamps: true,
                show_target: true,
                json_format: false,
                file_output: None,
            },
        }
    }

    /// Start from the mode's defaults and apply the global CLI flags.
    ///
    /// `-v` only ever raises verbosity above the mode's level; `-q` drops it
    /// to errors.
    pub fn from_args(mode: ApplicationMode, quiet: bool, verbose: u8, json: bool) -> Self {
        let mut config = Self::for_mode(mode);

        let requested = match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        config.level = if quiet {
            Level::ERROR
        } else {
            config.level.max(requested)
        };

        if mode == ApplicationMode::Cli {
            config.color = !quiet && !json && io::IsTerminal::is_terminal(&io::stderr());
            config.show_timestamps = verbose > 0 || json;
            config.show_target = verbose > 1;
        }
        config.json_format = json;
        config
    }

    pub fn with_file_output(mut self, path: Option<PathBuf>) -> Self {
        self.file_output = path;
        self
    }

    /// Directive used when `RUST_LOG` is not set
    pub fn default_directive(&self) -> String {
        format!("smart_todo={}", self.level)
    }
}

/// Initialize the logging system
pub fn init_logging(config: LoggingConfig) -> io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));

    let registry = Registry::default().with(env_filter);

    if let Some(log_file) = config.file_output {
        let (dir, file_name) = split_log_path(&log_file)?;
        let file_appender = tracing_appender::rolling::daily(dir, file_name);

        if config.json_format {
            fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(file_appender)
                .with_subscriber(registry)
                .init();
        } else {
            fmt::layer()
                .with_target(config.show_target)
                .with_level(true)
                .with_ansi(false)
                .with_timer(fmt::time::ChronoUtc::rfc_3339())
                .with_writer(file_appender)
                .with_subscriber(registry)
                .init();
        }
    } else if config.json_format {
        fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(io::stderr)
            .with_subscriber(registry)
            .init();
    } else {
        let fmt_layer = fmt::layer()
            .with_target(config.show_target)
            .with_level(true)
            .with_ansi(config.color)
            .with_writer(io::stderr);

        if config.show_timestamps {
            fmt_layer
                .with_timer(fmt::time::ChronoUtc::rfc_3339())
                .with_subscriber(registry)
                .init();
        } else {
            fmt_layer.without_time().with_subscriber(registry).init();
        }
    }

    Ok(())
}

fn split_log_path(log_file: &Path) -> io::Result<(&Path, &std::ffi::OsStr)> {
    let dir = log_file
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Invalid log file path"))?;
    let name = log_file
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Invalid log file name"))?;
    Ok((dir, name))
}

/// Default log directory: `~/.smart-todo/logs`
pub fn log_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".smart-todo").join("logs"))
}

/// Server log file, honoring `STODO_LOG_FILE`
pub fn server_log_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("STODO_LOG_FILE") {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    log_dir().map(|dir| dir.join("server.log"))
}

/// Remove rotated log files (`*.log.YYYY-MM-DD`) older than `retention_days`.
pub fn cleanup_old_logs(log_dir: &Path, retention_days: u32) -> io::Result<usize> {
    use std::fs;
    use std::time::{Duration, SystemTime};

    if !log_dir.exists() {
        return Ok(0);
    }

    let now = SystemTime::now();
    let retention = Duration::from_secs(u64::from(retention_days) * 24 * 60 * 60);
    let mut cleaned = 0;

    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        if !path.to_string_lossy().contains(".log.") || !path.is_file() {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        if let Ok(age) = now.duration_since(modified) {
            if age > retention {
                match fs::remove_file(&path) {
                    Ok(_) => {
                        cleaned += 1;
                        tracing::info!(
                            "Cleaned up old log file: {} (age: {} days)",
                            path.display(),
                            age.as_secs() / 86400
                        );
                    },
                    Err(e) => {
                        tracing::warn!("Failed to remove old log file {}: {}", path.display(), e);
                    },
                }
            }
        }
    }

    Ok(cleaned)
}
