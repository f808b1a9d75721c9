//! Minimal logger.
//!
//! Prints `[elapsed LEVEL] message` to stderr. Board generation reports
//! progress and recoverable problems (missing config, unknown family, skipped
//! PDF export) through the `log` facade; install this once at startup with
//! [`init_with_level`].

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

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let mut stderr = std::io::stderr().lock();
        if self.level >= LevelFilter::Debug {
            let module = record.target().rsplit("::").next().unwrap_or("");
            let _ = writeln!(
                stderr,
                "[{:7.3}s {:>5} {}] {}",
                elapsed,
                record.level(),
                module,
                record.args()
            );
        } else {
            let _ = writeln!(
                stderr,
                "[{:7.3}s {:>5}] {}",
                elapsed,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Map a `-v` repetition count to a level filter: info, debug, then trace.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the stderr logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install a `tracing` subscriber instead of the stderr logger.
///
/// Spans on board composition are closed with timing information.
#[cfg(feature = "tracing")]
pub fn init_tracing(level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));
    let _ = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_timer(fmt::time::Uptime::default())
        .with_writer(std::io::stderr)
        .finish()
        .try_init();
}
