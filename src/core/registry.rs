//! Logger registry
//!
//! The registry owns the root logger, every named logger and every appender,
//! keyed by unique name. One process-wide instance is available through
//! [`LoggerRegistry::global`]; independent instances are useful in tests.

use super::{
    appender::SharedAppender,
    error::{LoggerError, Result},
    log_level::LogLevel,
    logger::{Hierarchy, Logger, DEFAULT_ROOT_LEVEL},
    metrics::LoggerMetrics,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Name of the root logger
pub const ROOT_LOGGER: &str = "root";

static GLOBAL: OnceLock<Arc<LoggerRegistry>> = OnceLock::new();

pub struct LoggerRegistry {
    hierarchy: Arc<Hierarchy>,
    root: Arc<Logger>,
    loggers: RwLock<BTreeMap<String, Arc<Logger>>>,
    appenders: RwLock<BTreeMap<String, SharedAppender>>,
    file_appenders_installed: AtomicBool,
    trace_listener_attached: AtomicBool,
}

impl LoggerRegistry {
    #[must_use]
    pub fn new() -> Self {
        let hierarchy = Arc::new(Hierarchy::new());
        let root = Arc::new(Logger::root(Arc::clone(&hierarchy), ROOT_LOGGER));
        Self {
            hierarchy,
            root,
            loggers: RwLock::new(BTreeMap::new()),
            appenders: RwLock::new(BTreeMap::new()),
            file_appenders_installed: AtomicBool::new(false),
            trace_listener_attached: AtomicBool::new(false),
        }
    }

    /// The process-wide registry
    pub fn global() -> &'static Arc<LoggerRegistry> {
        GLOBAL.get_or_init(|| Arc::new(LoggerRegistry::new()))
    }

    pub fn root(&self) -> Arc<Logger> {
        Arc::clone(&self.root)
    }

    /// Get the logger called `name`, creating it on first use
    pub fn logger(&self, name: &str) -> Arc<Logger> {
        if name == ROOT_LOGGER {
            return self.root();
        }
        if let Some(logger) = self.loggers.read().get(name) {
            return Arc::clone(logger);
        }
        let mut loggers = self.loggers.write();
        Arc::clone(
            loggers
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Logger::child(name, self.root()))),
        )
    }

    /// Get an existing logger without creating it
    pub fn find_logger(&self, name: &str) -> Option<Arc<Logger>> {
        if name == ROOT_LOGGER {
            return Some(self.root());
        }
        self.loggers.read().get(name).cloned()
    }

    /// Every named logger, root excluded, ordered by name
    pub fn current_loggers(&self) -> Vec<Arc<Logger>> {
        self.loggers.read().values().cloned().collect()
    }

    /// Root followed by every named logger
    pub fn all_loggers(&self) -> Vec<Arc<Logger>> {
        let mut loggers = vec![self.root()];
        loggers.extend(self.current_loggers());
        loggers
    }

    pub fn threshold(&self) -> LogLevel {
        *self.hierarchy.threshold.read()
    }

    pub fn set_threshold(&self, level: LogLevel) {
        *self.hierarchy.threshold.write() = level;
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.hierarchy.metrics
    }

    /// Register a named appender
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::DuplicateAppender`] if the name is taken
    pub fn register_appender(&self, appender: SharedAppender) -> Result<SharedAppender> {
        let mut appenders = self.appenders.write();
        if appenders.contains_key(appender.name()) {
            return Err(LoggerError::duplicate_appender(appender.name()));
        }
        appenders.insert(appender.name().to_string(), Arc::clone(&appender));
        Ok(appender)
    }

    pub fn appender(&self, name: &str) -> Option<SharedAppender> {
        self.appenders.read().get(name).cloned()
    }

    pub fn has_appender(&self, name: &str) -> bool {
        self.appenders.read().contains_key(name)
    }

    pub fn appenders(&self) -> Vec<SharedAppender> {
        self.appenders.read().values().cloned().collect()
    }

    /// Unregister an appender and detach it from every logger
    pub fn remove_appender(&self, name: &str) -> Option<SharedAppender> {
        let removed = self.appenders.write().remove(name)?;
        for logger in self.all_loggers() {
            logger.remove_appender(name);
        }
        if let Err(e) = removed.flush() {
            eprintln!("[LOGGER WARNING] Flushing removed appender '{}' failed: {}", name, e);
        }
        Some(removed)
    }

    /// Flush every registered appender, returning the first failure
    pub fn flush_all(&self) -> Result<()> {
        let mut first_error = None;
        for appender in self.appenders() {
            if let Err(e) = appender.flush() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Drop all appenders and restore default levels.
    ///
    /// Loggers stay registered so handles held by callers remain valid. The
    /// one-shot installation flags are left untouched.
    pub fn reset_configuration(&self) {
        if let Err(e) = self.flush_all() {
            eprintln!("[LOGGER WARNING] Flush during reset failed: {}", e);
        }
        self.appenders.write().clear();
        self.set_threshold(LogLevel::Trace);

        self.root.clear_appenders();
        self.root.set_level(Some(DEFAULT_ROOT_LEVEL));
        for logger in self.current_loggers() {
            logger.clear_appenders();
            logger.set_level(None);
            logger.set_additive(true);
        }
    }

    /// Claim the one-shot file appender installation.
    ///
    /// Returns `true` exactly once per registry unless released again.
    pub fn claim_file_appenders(&self) -> bool {
        self.file_appenders_installed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Give the claim back after a failed installation
    pub fn release_file_appenders(&self) {
        self.file_appenders_installed.store(false, Ordering::Release);
    }

    pub fn file_appenders_installed(&self) -> bool {
        self.file_appenders_installed.load(Ordering::Acquire)
    }

    pub(crate) fn claim_trace_listener(&self) -> bool {
        self.trace_listener_attached
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn trace_listener_attached(&self) -> bool {
        self.trace_listener_attached.load(Ordering::Acquire)
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("threshold", &self.threshold())
            .field("root", &self.root)
            .field("loggers", &self.loggers.read().keys().collect::<Vec<_>>())
            .field("appenders", &self.appenders.read().keys().collect::<Vec<_>>())
            .finish()
    }
}
