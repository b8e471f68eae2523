//! Appender implementations

pub mod console;
pub mod file;
pub mod locking;
pub mod memory;
pub mod rolling_file;

pub use console::{ConsoleAppender, ConsoleTarget};
pub use file::FileAppender;
pub use locking::LockingModel;
pub use memory::{MemoryAppender, MemoryBuffer};
pub use rolling_file::{
    parse_size, RollingFileAppender, RollingPolicy, RollingStyle, DEFAULT_MAX_BACKUPS,
    DEFAULT_MAX_FILE_SIZE,
};

pub use crate::core::Appender;
