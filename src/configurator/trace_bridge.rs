//! System trace listener
//!
//! Forwards records emitted through the `log` facade, by this process or any
//! library it links, into the registry's trace logger.

use crate::core::error::Result;
use crate::core::{LogEntry, LogLevel, Logger};
use std::sync::Arc;

pub struct TraceBridge {
    logger: Arc<Logger>,
}

impl TraceBridge {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    /// Translate a facade record into an entry for the trace logger
    pub fn entry_for(&self, record: &log::Record<'_>) -> LogEntry {
        let message = if record.target().is_empty() {
            record.args().to_string()
        } else {
            format!("{}: {}", record.target(), record.args())
        };
        LogEntry::new(record.level().into(), self.logger.name(), message).with_location(
            record.file().unwrap_or("?"),
            record.line().unwrap_or(0),
            record.module_path().unwrap_or_else(|| record.target()),
        )
    }
}

impl log::Log for TraceBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        self.logger.is_enabled(LogLevel::from(metadata.level()))
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            self.logger.log_entry(&self.entry_for(record));
        }
    }

    fn flush(&self) {
        if let Err(e) = self.logger.flush() {
            eprintln!("[LOGGER WARNING] Flushing trace listener failed: {}", e);
        }
    }
}

/// Install the bridge as the process-wide `log` logger.
///
/// # Errors
///
/// [`LoggerError::TraceListener`](crate::core::LoggerError::TraceListener) if
/// another logger already owns the facade
pub fn install(logger: Arc<Logger>) -> Result<()> {
    log::set_boxed_logger(Box::new(TraceBridge::new(logger)))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
