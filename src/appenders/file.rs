//! File appender implementation

use super::locking::{LockingModel, LogFile};
use crate::core::{Appender, LogEntry, Result};
use std::path::{Path, PathBuf};

/// Plain (non-rolling) file appender. Parent directories are created on open.
pub struct FileAppender {
    file: LogFile,
}

impl FileAppender {
    /// Open `path` in append mode with an exclusive lock
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_options(path, LockingModel::Exclusive, true)
    }

    /// Open `path` with an explicit locking model and append/truncate choice
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rust_log_configurator::appenders::{FileAppender, LockingModel};
    ///
    /// let appender = FileAppender::with_options("/var/log/app.log", LockingModel::Minimal, true)
    ///     .unwrap();
    /// ```
    pub fn with_options(path: impl Into<PathBuf>, locking: LockingModel, append: bool) -> Result<Self> {
        let path = path.into();
        Ok(Self {
            file: LogFile::open(&path, locking, append)?,
        })
    }

    pub fn locking_model(&self) -> LockingModel {
        self.file.model()
    }
}

impl Appender for FileAppender {
    fn append(&mut self, _entry: &LogEntry, rendered: &str) -> Result<()> {
        self.file.write(rendered.as_bytes())
    }

    fn flush(&mut self) -> Result<()> {
        self.file.flush()
    }

    fn kind(&self) -> &str {
        "file"
    }

    fn path(&self) -> Option<&Path> {
        Some(self.file.path())
    }
}
