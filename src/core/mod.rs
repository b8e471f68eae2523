//! Core logger types and traits

pub mod appender;
pub mod error;
pub mod filter;
pub mod layout;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod registry;
pub mod timestamp;

pub use appender::{Appender, AppenderHandle, SharedAppender};
pub use error::{LoggerError, Result};
pub use filter::LevelRangeFilter;
pub use layout::{Layout, PatternLayout, CONSOLE_PATTERN, DEFAULT_PATTERN, DETAILED_PATTERN};
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::{Logger, DEFAULT_ROOT_LEVEL};
pub use metrics::LoggerMetrics;
pub use registry::{LoggerRegistry, ROOT_LOGGER};
pub use timestamp::TimestampFormat;
