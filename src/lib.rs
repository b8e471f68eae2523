//! # Rust Log Configurator
//!
//! Logging setup for command-line applications, built on a small log4net
//! style framework of named loggers and appenders.
//!
//! ## Features
//!
//! - **XML Configuration**: `logging.xml` next to the installation, or a
//!   platform default compiled into the binary
//! - **Rolling Files**: main and summary logs rolled at 10 MB with 50 backups,
//!   written under a minimal lock so other processes can read them
//! - **Runtime Verbosity**: debug, verbose and trace toggles for command-line flags
//! - **Trace Bridge**: records from the `log` facade flow into the `Trace` logger
//!
//! ```no_run
//! use rust_log_configurator::configurator::{self, VerbosityFlags};
//!
//! configurator::configure("/opt/tool")?;
//! configurator::install_file_appenders("/var/log/tool", "tool", &["Trace"])?;
//! configurator::apply_verbosity(VerbosityFlags::new(false, true, false), &[]);
//!
//! let logger = rust_log_configurator::logger("tool");
//! rust_log_configurator::info!(logger, "ready");
//! # Ok::<(), rust_log_configurator::LoggerError>(())
//! ```

pub mod appenders;
pub mod config;
pub mod configurator;
pub mod core;
pub mod macros;

use std::sync::Arc;

pub mod prelude {
    pub use crate::appenders::{
        ConsoleAppender, FileAppender, LockingModel, MemoryAppender, RollingFileAppender,
        RollingPolicy, RollingStyle,
    };
    pub use crate::config::{ConfigSource, LoggingConfig, Platform};
    pub use crate::configurator::{
        ConfiguratorSettings, FileLogSettings, LogConfigurator, TraceActivation, VerbosityFlags,
    };
    pub use crate::core::{
        Appender, AppenderHandle, LevelRangeFilter, Layout, LogEntry, LogLevel, Logger,
        LoggerError, LoggerMetrics, LoggerRegistry, Result, SharedAppender,
    };
}

pub use crate::appenders::{ConsoleAppender, FileAppender, MemoryAppender, RollingFileAppender};
pub use crate::configurator::{ConfiguratorSettings, LogConfigurator};
pub use crate::core::{
    Appender, AppenderHandle, LevelRangeFilter, Layout, LogEntry, LogLevel, Logger, LoggerError,
    LoggerMetrics, LoggerRegistry, Result, SharedAppender,
};

/// Logger called `name` in the process-wide registry
pub fn logger(name: &str) -> Arc<Logger> {
    LoggerRegistry::global().logger(name)
}
