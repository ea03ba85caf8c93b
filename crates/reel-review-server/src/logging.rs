use anyhow::Result;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// Pick the filter directive for the given flags.
///
/// 0 = configured level, 1 = debug (with hyper internals suppressed), 2+ = trace
pub fn filter_directive(verbose_level: u8, quiet: bool, default_level: &str) -> String {
    if quiet {
        return "error".to_string();
    }
    match verbose_level {
        0 => default_level.to_string(),
        1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn,hyper_util=warn".to_string(),
        _ => "trace".to_string(),
    }
}

/// JSON output: `RUST_LOG_JSON` wins, then the config file, then JSON whenever
/// stdout is not a terminal
pub fn use_json(env: Option<String>, configured: Option<bool>, stdout_is_terminal: bool) -> bool {
    match env {
        Some(v) => v == "true",
        None => configured.unwrap_or(!stdout_is_terminal),
    }
}

pub fn init_logging_with_file(
    verbose_level: u8,
    quiet: bool,
    default_level: &str,
    json_configured: Option<bool>,
    log_file: Option<PathBuf>,
) -> Result<()> {
    let directive = filter_directive(verbose_level, quiet, default_level);
    let filter = if quiet {
        EnvFilter::new(directive)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
    };

    let json = use_json(
        std::env::var("RUST_LOG_JSON").ok(),
        json_configured,
        io::stdout().is_terminal(),
    );

    let registry = Registry::default().with(filter);

    // If log file is provided, write to file; otherwise write to stderr
    if let Some(log_path) = log_file {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Files will be named: reel-review.log.2026-01-17, etc.
        let log_dir = log_path.parent()
            .ok_or_else(|| anyhow::anyhow!("Log file path has no parent directory"))?;
        let log_filename = log_path.file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid log filename"))?;

        let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, log_filename);

        if json {
            let json_layer = fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(file_appender);

            registry.with(json_layer).try_init()?;
        } else {
            let fmt_layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false)  // Disable ANSI codes when writing to file
                .with_writer(file_appender);

            registry.with(fmt_layer).try_init()?;
        }
    } else if json {
        let json_layer = fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);

        registry.with(json_layer).try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);

        registry.with(fmt_layer).try_init()?;
    }

    Ok(())
}
