//! Rolling file appender
//!
//! Rolls the active file over to numbered backups (`app.log.1`, `app.log.2`,
//! ...) when it grows past a size limit or when the calendar day changes,
//! keeping a bounded number of backups.

use super::locking::{LockingModel, LogFile};
use crate::core::appender::Appender;
use crate::core::error::{LoggerError, Result};
use crate::core::log_entry::LogEntry;
use chrono::{DateTime, Local};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default size limit per file (10 MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default number of backups retained
pub const DEFAULT_MAX_BACKUPS: usize = 50;

/// When the active file is rolled over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollingStyle {
    /// Roll when the file reaches `max_bytes`
    Size { max_bytes: u64 },

    /// Roll on the first write of a new local calendar day
    Daily,

    /// Roll on size or day change, whichever comes first
    Composite { max_bytes: u64 },
}

impl Default for RollingStyle {
    fn default() -> Self {
        RollingStyle::Size {
            max_bytes: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl RollingStyle {
    #[must_use]
    pub fn size(max_bytes: u64) -> Self {
        RollingStyle::Size { max_bytes }
    }

    /// Size limit, if this style rolls on size
    #[must_use]
    pub fn max_bytes(&self) -> Option<u64> {
        match self {
            RollingStyle::Size { max_bytes } | RollingStyle::Composite { max_bytes } => Some(*max_bytes),
            RollingStyle::Daily => None,
        }
    }

    /// Parse the XML `rolling-style` attribute. `max_bytes` applies to size
    /// based styles.
    pub fn parse(name: &str, max_bytes: u64) -> std::result::Result<Self, String> {
        match name.trim().to_lowercase().as_str() {
            "size" => Ok(RollingStyle::Size { max_bytes }),
            "daily" | "date" => Ok(RollingStyle::Daily),
            "composite" => Ok(RollingStyle::Composite { max_bytes }),
            other => Err(format!("Invalid rolling style: '{}'", other)),
        }
    }
}

/// Configuration for the rolling file appender
///
/// # Examples
///
/// ```
/// use rust_log_configurator::appenders::{LockingModel, RollingPolicy, RollingStyle};
///
/// let policy = RollingPolicy::new()
///     .with_max_size(10 * 1024 * 1024)
///     .with_max_backups(50)
///     .with_locking(LockingModel::Minimal);
///
/// assert_eq!(policy.style, RollingStyle::Size { max_bytes: 10 * 1024 * 1024 });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingPolicy {
    pub style: RollingStyle,
    /// Number of numbered backups kept; 0 truncates instead of rolling
    pub max_backups: usize,
    /// Gzip backups after they are rolled
    pub compress: bool,
    pub locking: LockingModel,
    /// Keep existing content on open
    pub append: bool,
}

impl Default for RollingPolicy {
    fn default() -> Self {
        Self {
            style: RollingStyle::default(),
            max_backups: DEFAULT_MAX_BACKUPS,
            compress: false,
            locking: LockingModel::Minimal,
            append: true,
        }
    }
}

impl RollingPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_style(mut self, style: RollingStyle) -> Self {
        self.style = style;
        self
    }

    /// Convenience for `with_style(RollingStyle::Size { max_bytes: size })`
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, size: u64) -> Self {
        self.style = RollingStyle::Size { max_bytes: size };
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_locking(mut self, locking: LockingModel) -> Self {
        self.locking = locking;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }
}

/// Parse sizes such as `10MB`, `512 KB`, `1gb` or plain byte counts
pub fn parse_size(value: &str) -> std::result::Result<u64, String> {
    let trimmed = value.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);

    let number: u64 = digits
        .parse()
        .map_err(|_| format!("Invalid size: '{}'", value))?;
    let multiplier = match unit.trim().to_uppercase().as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1024,
        "MB" | "M" => 1024 * 1024,
        "GB" | "G" => 1024 * 1024 * 1024,
        _ => return Err(format!("Invalid size unit in '{}'", value)),
    };
    number
        .checked_mul(multiplier)
        .ok_or_else(|| format!("Size too large: '{}'", value))
}

/// Rolling file appender
///
/// # Examples
///
/// ```no_run
/// use rust_log_configurator::appenders::{RollingFileAppender, RollingPolicy};
///
/// // 10 MB per file, 50 backups, minimal locking
/// let appender = RollingFileAppender::new("/var/log/app.log").unwrap();
///
/// let policy = RollingPolicy::new().with_max_size(1024 * 1024).with_compression(true);
/// let appender = RollingFileAppender::with_policy("/var/log/app.log", policy).unwrap();
/// ```
pub struct RollingFileAppender {
    file: LogFile,
    policy: RollingPolicy,
    last_roll: DateTime<Local>,
    /// Counter for consecutive deletion failures (reset on successful deletion)
    deletion_failure_count: usize,
}

impl RollingFileAppender {
    /// Create a rolling file appender with the default policy
    ///
    /// # Errors
    ///
    /// Returns error if the file or its directory cannot be created
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_policy(path, RollingPolicy::default())
    }

    /// # Errors
    ///
    /// Returns error if the file or its directory cannot be created
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RollingPolicy) -> Result<Self> {
        let base_path = path.as_ref();
        let file = LogFile::open(base_path, policy.locking, policy.append)?;

        // Day of the last modification decides whether a daily roll is due
        let last_roll = fs::metadata(base_path)
            .and_then(|m| m.modified())
            .map(DateTime::<Local>::from)
            .unwrap_or_else(|_| Local::now());

        Ok(Self {
            file,
            policy,
            last_roll,
            deletion_failure_count: 0,
        })
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.file.size()
    }

    #[must_use]
    pub fn policy(&self) -> &RollingPolicy {
        &self.policy
    }

    fn should_roll(&self) -> bool {
        let size_due = |max_bytes: u64| self.file.size() > 0 && self.file.size() >= max_bytes;
        let day_due = || Local::now().date_naive() != self.last_roll.date_naive();

        match self.policy.style {
            RollingStyle::Size { max_bytes } => size_due(max_bytes),
            RollingStyle::Daily => day_due(),
            RollingStyle::Composite { max_bytes } => size_due(max_bytes) || day_due(),
        }
    }

    /// Backup path for `index`, e.g. `app.log.3`
    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = OsString::from(self.file.path().as_os_str());
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn compressed(path: &Path) -> PathBuf {
        let mut name = OsString::from(path.as_os_str());
        name.push(".gz");
        PathBuf::from(name)
    }

    fn roll(&mut self) -> Result<()> {
        let base_path = self.file.path().to_path_buf();
        self.file.close().map_err(|e| {
            LoggerError::file_rotation(
                base_path.display().to_string(),
                format!("Failed to flush before rolling: {}", e),
            )
        })?;

        if self.policy.max_backups == 0 {
            File::create(&base_path).map_err(|e| {
                LoggerError::file_rotation(base_path.display().to_string(), format!("Failed to truncate: {}", e))
            })?;
            return self.finish_roll();
        }

        self.delete_oldest_backup(&base_path)?;

        for i in (1..self.policy.max_backups).rev() {
            let from = self.backup_path(i);
            let to = self.backup_path(i + 1);
            for (old, new) in [(Self::compressed(&from), Self::compressed(&to)), (from, to)] {
                if !old.exists() {
                    continue;
                }
                if fs::rename(&old, &new).is_err() {
                    // Some platforms refuse to rename over an existing file
                    let _ = fs::remove_file(&new);
                    fs::rename(&old, &new).map_err(|e| {
                        LoggerError::file_rotation(
                            old.display().to_string(),
                            format!("Failed to shift backup file: {}", e),
                        )
                    })?;
                }
            }
        }

        let first_backup = self.backup_path(1);
        if base_path.exists() {
            fs::rename(&base_path, &first_backup).map_err(|e| {
                LoggerError::file_rotation(
                    base_path.display().to_string(),
                    format!("Failed to roll current log file: {}", e),
                )
            })?;
            if self.policy.compress {
                Self::compress_file(&first_backup)?;
            }
        }

        self.finish_roll()
    }

    fn finish_roll(&mut self) -> Result<()> {
        self.file.reopen().map_err(|e| {
            LoggerError::file_rotation(
                self.file.path().display().to_string(),
                format!("Failed to create new log file: {}", e),
            )
        })?;
        self.last_roll = Local::now();
        Ok(())
    }

    fn delete_oldest_backup(&mut self, base_path: &Path) -> Result<()> {
        const MAX_DELETION_FAILURES: usize = 5;

        let oldest = self.backup_path(self.policy.max_backups);
        let mut deletion_failed = false;
        for candidate in [Self::compressed(&oldest), oldest] {
            if candidate.exists() {
                if let Err(e) = fs::remove_file(&candidate) {
                    deletion_failed = true;
                    eprintln!(
                        "[LOGGER WARNING] Failed to remove oldest backup {}: {} (failure #{}/{})",
                        candidate.display(),
                        e,
                        self.deletion_failure_count + 1,
                        MAX_DELETION_FAILURES
                    );
                }
            }
        }

        if !deletion_failed {
            self.deletion_failure_count = 0;
            return Ok(());
        }

        self.deletion_failure_count += 1;
        if self.deletion_failure_count >= MAX_DELETION_FAILURES {
            return Err(LoggerError::file_rotation(
                base_path.display().to_string(),
                format!(
                    "Rolling aborted: failed to delete old backup files {} consecutive times",
                    self.deletion_failure_count
                ),
            ));
        }
        Ok(())
    }

    /// Gzip `path` into `path.gz`, removing the original only on success
    fn compress_file(path: &Path) -> Result<()> {
        let gz_path = Self::compressed(path);
        let mut temp_name = OsString::from(gz_path.as_os_str());
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        let result = (|| -> std::io::Result<()> {
            let mut reader = BufReader::with_capacity(64 * 1024, File::open(path)?);
            let output = BufWriter::with_capacity(64 * 1024, File::create(&temp_path)?);
            let mut encoder = flate2::write::GzEncoder::new(output, flate2::Compression::default());
            std::io::copy(&mut reader, &mut encoder)?;
            encoder.finish()?;
            fs::rename(&temp_path, &gz_path)
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(LoggerError::io_operation(
                "compress log file",
                format!("Failed to compress {}", path.display()),
                e,
            ));
        }

        if let Err(e) = fs::remove_file(path) {
            eprintln!(
                "[LOGGER WARNING] Compressed {} but failed to remove the original: {}",
                path.display(),
                e
            );
        }
        Ok(())
    }
}

impl Appender for RollingFileAppender {
    fn append(&mut self, _entry: &LogEntry, rendered: &str) -> Result<()> {
        if self.should_roll() {
            if let Err(e) = self.roll() {
                // Keep writing to the current file rather than losing events
                eprintln!("[LOGGER WARNING] Log rolling failed: {}. Continuing with current file.", e);

                if !self.file.is_open() {
                    if let Err(reopen_err) = self.file.reopen() {
                        eprintln!(
                            "[LOGGER ERROR] Failed to reopen log file after rolling failure: {}",
                            reopen_err
                        );
                        return Err(e);
                    }
                }

                // Prevents retrying the roll on every subsequent write
                self.file.reset_size();
                self.last_roll = Local::now();
            }
        }

        self.file.write(rendered.as_bytes())
    }

    fn flush(&mut self) -> Result<()> {
        self.file.flush()
    }

    fn kind(&self) -> &str {
        "rolling-file"
    }

    fn path(&self) -> Option<&Path> {
        Some(self.file.path())
    }
}

impl FromStr for RollingStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        RollingStyle::parse(s, DEFAULT_MAX_FILE_SIZE)
    }
}
