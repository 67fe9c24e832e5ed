use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, fmt, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

pub const CLI_PREFIX: &str = "cli";

const MAX_LOG_FILES: usize = 5;

/// Where log output goes and how much of it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSettings {
    /// Explicit level. Falls back to `RUST_LOG`, then to `debug`.
    pub level: Option<LevelFilter>,
    /// Mirror logs to stdout. Mixes with interactive output, so only meant for debugging.
    pub console: bool,
}

impl LogSettings {
    fn filter(&self) -> EnvFilter {
        let level = self
            .level
            .map(|v| v.to_string())
            .unwrap_or_else(|| std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".into()));
        EnvFilter::new(format!(
            "{}={level}",
            env!("CARGO_PKG_NAME").replace("-", "_"),
        ))
    }
}

fn file_appender(prefix: &str, log_dir: &Path) -> Result<RollingFileAppender> {
    Ok(RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(prefix)
        .build(log_dir)?)
}

/// Installs the global subscriber. Logs go to daily rolling files in `log_dir` when it's given.
///
/// The subscriber is installed even if the log directory can't be used; in that case file logging
/// is skipped and the appender error is returned for the caller to report.
pub fn enable_logging(prefix: &str, log_dir: Option<&Path>, settings: LogSettings) -> Result<()> {
    let (appender, appender_error) = match log_dir.map(|v| file_appender(prefix, v)).transpose() {
        Ok(appender) => (appender, None),
        Err(e) => (None, Some(e)),
    };

    let file_layer = appender.map(|v| {
        fmt::layer()
            .with_writer(v)
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
    });
    let console_layer = settings.console.then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_span_events(FmtSpan::CLOSE)
    });

    tracing_subscriber::registry()
        .with(settings.filter())
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    match appender_error {
        Some(e) => Err(e.context("File logging is disabled")),
        None => Ok(()),
    }
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_span_events(FmtSpan::CLOSE)
        .with_test_writer()
        .pretty()
        .init()
});
