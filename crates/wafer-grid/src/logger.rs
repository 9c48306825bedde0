//! Minimal stderr logger for binaries built on this crate.
//!
//! Prints `[elapsed LEVEL] target: message`, or one JSON object per line
//! with [`LogFormat::Json`]. Install once at startup with [`init_logger`];
//! with the `tracing` feature, [`init_tracing`] installs a
//! `tracing-subscriber` instead.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Line format of the installed logger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

struct StderrLogger {
    level: LevelFilter,
    format: LogFormat,
    started: Instant,
}

impl StderrLogger {
    fn format_line(&self, record: &Record, elapsed: f64) -> String {
        match self.format {
            LogFormat::Text => format!(
                "[{:7.3}s {:>5}] {}: {}",
                elapsed,
                record.level(),
                record.target(),
                record.args()
            ),
            LogFormat::Json => serde_json::json!({
                "elapsed_s": elapsed,
                "level": record.level().as_str(),
                "target": record.target(),
                "message": record.args().to_string(),
            })
            .to_string(),
        }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = self.format_line(record, self.started.elapsed().as_secs_f64());
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter and format.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_logger(level: LevelFilter, format: LogFormat) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            level,
            format,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install the plain-text stderr logger.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    init_logger(level, LogFormat::Text)
}

#[cfg(feature = "tracing")]
fn default_directive(level: LevelFilter) -> String {
    level.as_str().to_ascii_lowercase()
}

/// Install a `tracing` subscriber reporting span timings on close.
///
/// `RUST_LOG` wins when set; otherwise events at `level` and above pass.
/// Returns `false` if a global subscriber was already installed.
#[cfg(feature = "tracing")]
pub fn init_tracing(level: LevelFilter, format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);
    let installed = match format {
        LogFormat::Json => builder.json().flatten_event(true).finish().try_init(),
        LogFormat::Text => builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init(),
    };
    installed.is_ok()
}
