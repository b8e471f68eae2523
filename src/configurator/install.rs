//! One-shot installation of the main and summary rolling file appenders

use super::LogConfigurator;
use crate::appenders::{RollingFileAppender, RollingPolicy};
use crate::core::appender::{AppenderHandle, SharedAppender};
use crate::core::error::{LoggerError, Result};
use crate::core::filter::LevelRangeFilter;
use crate::core::layout::Layout;
use crate::core::log_level::LogLevel;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the rolling file pair goes and how it rolls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLogSettings {
    pub dir: PathBuf,
    pub base_name: String,
    /// Loggers that keep their current appenders
    pub excluded_loggers: Vec<String>,
    pub policy: RollingPolicy,
}

impl FileLogSettings {
    pub fn new(dir: impl Into<PathBuf>, base_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_name: base_name.into(),
            excluded_loggers: Vec::new(),
            policy: RollingPolicy::default(),
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_excluded_loggers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_loggers = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_policy(mut self, policy: RollingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// `<dir>/<base>.log`
    pub fn main_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.base_name))
    }

    /// `<dir>/<base>.summary.log`
    pub fn summary_path(&self) -> PathBuf {
        self.dir.join(format!("{}.summary.log", self.base_name))
    }

    fn is_empty(&self) -> bool {
        self.dir.as_os_str().is_empty() || self.base_name.trim().is_empty()
    }
}

impl LogConfigurator {
    /// Install `MainLog` and `SummaryLog` under `dir` and attach them to the
    /// root logger and every logger not named in `excluded_loggers`.
    ///
    /// Returns `Ok(false)` without touching anything when `dir` or
    /// `base_name` is empty, or when the pair was already installed in this
    /// registry.
    ///
    /// # Errors
    ///
    /// Directory creation or log file opening failures. The installation can
    /// be retried after an error.
    pub fn install_file_appenders(&self, dir: &str, base_name: &str, excluded_loggers: &[&str]) -> Result<bool> {
        let settings = FileLogSettings::new(dir.trim(), base_name.trim())
            .with_excluded_loggers(excluded_loggers.iter().copied());
        self.install_file_appenders_with(&settings)
    }

    /// [`install_file_appenders`](Self::install_file_appenders) with a custom
    /// rolling policy
    ///
    /// # Errors
    ///
    /// See [`install_file_appenders`](Self::install_file_appenders)
    pub fn install_file_appenders_with(&self, settings: &FileLogSettings) -> Result<bool> {
        if settings.is_empty() {
            return Ok(false);
        }
        if !self.registry.claim_file_appenders() {
            return Ok(false);
        }

        match self.build_file_pair(settings) {
            Ok((main, summary)) => {
                self.attach_file_pair(settings, &main, &summary);
                Ok(true)
            }
            Err(e) => {
                self.registry.release_file_appenders();
                Err(e)
            }
        }
    }

    fn build_file_pair(&self, settings: &FileLogSettings) -> Result<(SharedAppender, SharedAppender)> {
        create_log_dir(&settings.dir)?;

        let main = AppenderHandle::new(
            self.settings.main_appender.as_str(),
            RollingFileAppender::with_policy(settings.main_path(), settings.policy.clone())?,
        )
        .with_layout(Layout::default())
        .shared();
        let summary = AppenderHandle::new(
            self.settings.summary_appender.as_str(),
            RollingFileAppender::with_policy(settings.summary_path(), settings.policy.clone())?,
        )
        .with_layout(Layout::default())
        .with_filter(LevelRangeFilter::at_least(LogLevel::Info))
        .shared();

        let main = self.registry.register_appender(main)?;
        if let Err(e) = self.registry.register_appender(Arc::clone(&summary)) {
            self.registry.remove_appender(main.name());
            return Err(e);
        }
        Ok((main, summary))
    }

    fn attach_file_pair(&self, settings: &FileLogSettings, main: &SharedAppender, summary: &SharedAppender) {
        for logger in self.registry.all_loggers() {
            if !logger.is_root() && settings.excluded_loggers.iter().any(|name| name == logger.name()) {
                continue;
            }
            logger.add_appender(Arc::clone(main));
            logger.add_appender(Arc::clone(summary));
        }
    }
}

fn create_log_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| {
        LoggerError::io_operation(
            "creating log directory",
            format!("Failed to create '{}'", dir.display()),
            e,
        )
    })
}
