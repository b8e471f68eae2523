//! File access shared by the plain and rolling file appenders
//!
//! Two locking models exist:
//! - `Exclusive`: the file is opened once and an exclusive lock is held until
//!   the appender is closed.
//! - `Minimal`: the file is opened, locked, written, unlocked and closed for
//!   every event, so other processes can read (and rotate) it in between.

use crate::core::error::{LoggerError, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::thread;
use std::time::Duration;

/// Attempts a minimal-lock write makes before giving up on a held lock
pub const MINIMAL_LOCK_ATTEMPTS: u32 = 40;

/// Pause between minimal-lock attempts
pub const MINIMAL_LOCK_RETRY_DELAY: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockingModel {
    #[default]
    Exclusive,
    Minimal,
}

impl FromStr for LockingModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        // log4net names the model as `log4net.Appender.FileAppender+MinimalLock`
        let short = s.trim().rsplit(['+', '.']).next().unwrap_or(s).to_lowercase();
        match short.as_str() {
            "exclusive" | "exclusive-lock" | "exclusivelock" => Ok(LockingModel::Exclusive),
            "minimal" | "minimal-lock" | "minimallock" => Ok(LockingModel::Minimal),
            _ => Err(format!("Invalid locking model: '{}'", s)),
        }
    }
}

pub(crate) struct LogFile {
    path: PathBuf,
    model: LockingModel,
    writer: Option<BufWriter<File>>,
    size: u64,
}

impl LogFile {
    /// Open `path`, creating parent directories. With `append == false` any
    /// existing content is discarded.
    pub(crate) fn open(path: &Path, model: LockingModel, append: bool) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        if !append {
            File::create(path).map_err(|e| {
                LoggerError::file_appender(path.display().to_string(), format!("Failed to truncate: {}", e))
            })?;
        }

        let mut log_file = Self {
            path: path.to_path_buf(),
            model,
            writer: None,
            size: 0,
        };
        log_file.reopen()?;
        Ok(log_file)
    }

    fn open_append(path: &Path) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_appender(path.display().to_string(), format!("Failed to open: {}", e))
            })
    }

    /// (Re)open after creation or rotation
    pub(crate) fn reopen(&mut self) -> Result<()> {
        let file = Self::open_append(&self.path)?;
        self.size = file
            .metadata()
            .map_err(|e| {
                LoggerError::file_appender(
                    self.path.display().to_string(),
                    format!("Cannot access file metadata: {}", e),
                )
            })?
            .len();

        if self.model == LockingModel::Exclusive {
            file.try_lock_exclusive()
                .map_err(|_| LoggerError::file_lock(self.path.display().to_string()))?;
            self.writer = Some(BufWriter::new(file));
        }
        Ok(())
    }

    pub(crate) fn write(&mut self, bytes: &[u8]) -> Result<()> {
        match self.model {
            LockingModel::Exclusive => {
                let writer = self
                    .writer
                    .as_mut()
                    .ok_or_else(|| LoggerError::writer("File writer not initialized"))?;
                writer.write_all(bytes).map_err(|e| {
                    LoggerError::file_appender(
                        self.path.display().to_string(),
                        format!("Failed to write log entry: {}", e),
                    )
                })?;
                self.size += bytes.len() as u64;
            }
            LockingModel::Minimal => {
                let mut file = Self::open_append(&self.path)?;
                self.lock_briefly(&file)?;
                let written = file.write_all(bytes).and_then(|_| file.flush());
                // Length re-read so writes from other processes count towards rolling
                let size = file.metadata().map(|m| m.len());
                let _ = file.unlock();
                written.map_err(|e| {
                    LoggerError::file_appender(
                        self.path.display().to_string(),
                        format!("Failed to write log entry: {}", e),
                    )
                })?;
                self.size = size.unwrap_or(self.size + bytes.len() as u64);
            }
        }
        Ok(())
    }

    /// Take the lock for one write, failing instead of waiting on a holder
    /// that never lets go (an exclusive appender on the same path)
    fn lock_briefly(&self, file: &File) -> Result<()> {
        for attempt in 1..=MINIMAL_LOCK_ATTEMPTS {
            if file.try_lock_exclusive().is_ok() {
                return Ok(());
            }
            if attempt < MINIMAL_LOCK_ATTEMPTS {
                thread::sleep(MINIMAL_LOCK_RETRY_DELAY);
            }
        }
        Err(LoggerError::file_lock(self.path.display().to_string()))
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush().map_err(|e| {
                LoggerError::file_appender(self.path.display().to_string(), format!("Failed to flush: {}", e))
            })?;
        }
        Ok(())
    }

    /// Flush, unlock and release the handle
    pub(crate) fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_appender(self.path.display().to_string(), format!("Failed to flush: {}", e))
            })?;
            let _ = writer.get_ref().unlock();
        }
        Ok(())
    }

    pub(crate) fn is_open(&self) -> bool {
        self.model == LockingModel::Minimal || self.writer.is_some()
    }

    pub(crate) fn reset_size(&mut self) {
        self.size = 0;
    }

    pub(crate) fn size(&self) -> u64 {
        self.size
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn model(&self) -> LockingModel {
        self.model
    }
}

impl Drop for LogFile {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_locking_model() {
        assert_eq!("minimal".parse::<LockingModel>().unwrap(), LockingModel::Minimal);
        assert_eq!("MinimalLock".parse::<LockingModel>().unwrap(), LockingModel::Minimal);
        assert_eq!("exclusive".parse::<LockingModel>().unwrap(), LockingModel::Exclusive);
        assert_eq!(
            "log4net.Appender.FileAppender+MinimalLock".parse::<LockingModel>().unwrap(),
            LockingModel::Minimal
        );
        assert_eq!("ExclusiveLock".parse::<LockingModel>().unwrap(), LockingModel::Exclusive);
        assert!("shared".parse::<LockingModel>().is_err());
    }

    #[test]
    fn test_minimal_lock_writes_are_visible_immediately() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("minimal.log");

        let mut log = LogFile::open(&path, LockingModel::Minimal, true).unwrap();
        log.write(b"first\n").unwrap();

        // No flush needed, the handle was closed after the write
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\n");
        assert_eq!(log.size(), 6);
    }

    #[test]
    fn test_minimal_write_gives_up_on_held_lock() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("contended.log");

        let _holder = LogFile::open(&path, LockingModel::Exclusive, true).unwrap();
        let mut minimal = LogFile::open(&path, LockingModel::Minimal, true).unwrap();

        let started = std::time::Instant::now();
        let err = minimal.write(b"blocked\n").unwrap_err();
        assert!(matches!(err, LoggerError::FileLockError { .. }));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn test_minimal_write_waits_out_a_short_lock() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("brief.log");
        let mut minimal = LogFile::open(&path, LockingModel::Minimal, true).unwrap();

        let other = File::options().append(true).open(&path).unwrap();
        other.lock_exclusive().unwrap();
        let releaser = thread::spawn(move || {
            thread::sleep(MINIMAL_LOCK_RETRY_DELAY * 2);
            other.unlock().unwrap();
        });

        minimal.write(b"after release\n").unwrap();
        releaser.join().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "after release\n");
    }

    #[test]
    fn test_exclusive_tracks_size_and_truncates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("exclusive.log");
        fs::write(&path, "old content\n").unwrap();

        let mut log = LogFile::open(&path, LockingModel::Exclusive, false).unwrap();
        assert_eq!(log.size(), 0);
        log.write(b"new\n").unwrap();
        log.flush().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
        assert_eq!(log.size(), 4);
    }

    #[test]
    fn test_append_keeps_existing_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("append.log");
        fs::write(&path, "0123456789").unwrap();

        let log = LogFile::open(&path, LockingModel::Minimal, true).unwrap();
        assert_eq!(log.size(), 10);
    }
}
