//! Named logger handles
//!
//! A [`Logger`] belongs to a [`LoggerRegistry`](super::registry::LoggerRegistry).
//! It owns a level (or inherits the root's), a list of shared appenders and an
//! additivity flag deciding whether events also flow to the root's appenders.

use super::{
    appender::SharedAppender,
    error::Result,
    log_entry::LogEntry,
    log_level::LogLevel,
    metrics::LoggerMetrics,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Level used when neither a logger nor the root has one
pub const DEFAULT_ROOT_LEVEL: LogLevel = LogLevel::Debug;

/// State every logger of one registry shares
#[derive(Debug)]
pub(crate) struct Hierarchy {
    pub(crate) threshold: RwLock<LogLevel>,
    pub(crate) metrics: LoggerMetrics,
}

impl Hierarchy {
    pub(crate) fn new() -> Self {
        Self {
            threshold: RwLock::new(LogLevel::Trace),
            metrics: LoggerMetrics::new(),
        }
    }
}

pub struct Logger {
    name: String,
    level: RwLock<Option<LogLevel>>,
    additive: AtomicBool,
    appenders: RwLock<Vec<SharedAppender>>,
    parent: Option<Arc<Logger>>,
    hierarchy: Arc<Hierarchy>,
}

impl Logger {
    pub(crate) fn root(hierarchy: Arc<Hierarchy>, name: &str) -> Self {
        Self {
            name: name.to_string(),
            level: RwLock::new(Some(DEFAULT_ROOT_LEVEL)),
            additive: AtomicBool::new(false),
            appenders: RwLock::new(Vec::new()),
            parent: None,
            hierarchy,
        }
    }

    pub(crate) fn child(name: &str, root: Arc<Logger>) -> Self {
        Self {
            name: name.to_string(),
            level: RwLock::new(None),
            additive: AtomicBool::new(true),
            appenders: RwLock::new(Vec::new()),
            hierarchy: Arc::clone(&root.hierarchy),
            parent: Some(root),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Level explicitly assigned to this logger, if any
    pub fn level(&self) -> Option<LogLevel> {
        *self.level.read()
    }

    /// Assigned level, or the root's when unassigned
    pub fn effective_level(&self) -> LogLevel {
        match *self.level.read() {
            Some(level) => level,
            None => self
                .parent
                .as_ref()
                .map_or(DEFAULT_ROOT_LEVEL, |parent| parent.effective_level()),
        }
    }

    pub fn set_level(&self, level: Option<LogLevel>) {
        *self.level.write() = level;
    }

    pub fn is_additive(&self) -> bool {
        self.additive.load(Ordering::Acquire)
    }

    pub fn set_additive(&self, additive: bool) {
        self.additive.store(additive, Ordering::Release);
    }

    /// Attach an appender. Returns `false` if one with the same name is
    /// already attached.
    pub fn add_appender(&self, appender: SharedAppender) -> bool {
        let mut appenders = self.appenders.write();
        if appenders.iter().any(|a| a.name() == appender.name()) {
            return false;
        }
        appenders.push(appender);
        true
    }

    pub fn remove_appender(&self, name: &str) -> Option<SharedAppender> {
        let mut appenders = self.appenders.write();
        let index = appenders.iter().position(|a| a.name() == name)?;
        Some(appenders.remove(index))
    }

    pub fn clear_appenders(&self) {
        self.appenders.write().clear();
    }

    pub fn has_appender(&self, name: &str) -> bool {
        self.appenders.read().iter().any(|a| a.name() == name)
    }

    pub fn appenders(&self) -> Vec<SharedAppender> {
        self.appenders.read().clone()
    }

    pub fn appender_names(&self) -> Vec<String> {
        self.appenders
            .read()
            .iter()
            .map(|a| a.name().to_string())
            .collect()
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level.is_emittable()
            && level >= *self.hierarchy.threshold.read()
            && level >= self.effective_level()
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if !self.is_enabled(level) {
            self.hierarchy.metrics.record_filtered();
            return;
        }
        self.dispatch(&LogEntry::new(level, self.name.as_str(), message));
    }

    /// Log with call-site information; used by the logging macros
    pub fn log_at(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        file: &str,
        line: u32,
        module_path: &str,
    ) {
        if !self.is_enabled(level) {
            self.hierarchy.metrics.record_filtered();
            return;
        }
        let entry =
            LogEntry::new(level, self.name.as_str(), message).with_location(file, line, module_path);
        self.dispatch(&entry);
    }

    /// Log a prepared entry, checking it against this logger's levels
    pub fn log_entry(&self, entry: &LogEntry) {
        if !self.is_enabled(entry.level) {
            self.hierarchy.metrics.record_filtered();
            return;
        }
        self.dispatch(entry);
    }

    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }

    /// Flush every appender this logger can reach
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for appender in self.reachable_appenders() {
            if let Err(e) = appender.flush() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Own appenders followed by the root's when additive, without duplicates
    fn reachable_appenders(&self) -> Vec<SharedAppender> {
        let mut targets = self.appenders();
        if self.is_additive() {
            if let Some(parent) = &self.parent {
                for appender in parent.reachable_appenders() {
                    if !targets.iter().any(|t| Arc::ptr_eq(t, &appender)) {
                        targets.push(appender);
                    }
                }
            }
        }
        targets
    }

    /// Deliver to every reachable appender with per-appender panic isolation.
    ///
    /// A failing or panicking appender does not stop delivery to the others.
    fn dispatch(&self, entry: &LogEntry) {
        let metrics = &self.hierarchy.metrics;
        let mut has_error = false;
        let mut delivered = false;

        for appender in self.reachable_appenders() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                appender.deliver(entry)
            }));

            match result {
                Ok(Ok(accepted)) => delivered |= accepted,
                Ok(Err(e)) => {
                    eprintln!(
                        "[LOGGER ERROR] Appender '{}' failed: {}",
                        appender.name(),
                        e
                    );
                    has_error = true;
                }
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    eprintln!(
                        "[LOGGER CRITICAL] Appender '{}' panicked: {}. \
                         Other appenders continue to function.",
                        appender.name(),
                        panic_msg
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            metrics.record_dropped();
        } else if delivered {
            metrics.record_logged();
        } else {
            metrics.record_filtered();
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &*self.level.read())
            .field("additive", &self.is_additive())
            .field("appenders", &self.appender_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::MemoryAppender;
    use crate::core::appender::{Appender, AppenderHandle};
    use crate::core::layout::Layout;

    fn family() -> (Arc<Logger>, Arc<Logger>) {
        let root = Arc::new(Logger::root(Arc::new(Hierarchy::new()), "root"));
        let child = Arc::new(Logger::child("app", Arc::clone(&root)));
        (root, child)
    }

    fn memory(name: &str) -> (SharedAppender, crate::appenders::MemoryBuffer) {
        let sink = MemoryAppender::new();
        let buffer = sink.buffer();
        let handle = AppenderHandle::new(name, sink)
            .with_layout(Layout::pattern("%logger:%message").unwrap())
            .shared();
        (handle, buffer)
    }

    #[test]
    fn test_level_inheritance() {
        let (root, child) = family();
        assert_eq!(child.level(), None);
        assert_eq!(child.effective_level(), DEFAULT_ROOT_LEVEL);

        root.set_level(Some(LogLevel::Warn));
        assert_eq!(child.effective_level(), LogLevel::Warn);
        assert!(!child.is_enabled(LogLevel::Info));

        child.set_level(Some(LogLevel::Trace));
        assert!(child.is_enabled(LogLevel::Trace));
        assert!(!child.is_enabled(LogLevel::Off));
    }

    #[test]
    fn test_threshold_gates_everything() {
        let (root, child) = family();
        child.set_level(Some(LogLevel::Trace));
        *root.hierarchy.threshold.write() = LogLevel::Error;
        assert!(!child.is_enabled(LogLevel::Warn));
        assert!(child.is_enabled(LogLevel::Error));
    }

    #[test]
    fn test_additivity_and_dedup() {
        let (root, child) = family();
        let (shared, shared_lines) = memory("shared");
        let (own, own_lines) = memory("own");

        root.add_appender(Arc::clone(&shared));
        child.add_appender(Arc::clone(&shared));
        child.add_appender(own);

        child.info("hello");
        assert_eq!(shared_lines.lines(), vec!["app:hello".to_string()]);
        assert_eq!(own_lines.lines(), vec!["app:hello".to_string()]);

        child.set_additive(false);
        child.remove_appender("shared");
        child.info("again");
        assert_eq!(shared_lines.len(), 1);
        assert_eq!(own_lines.len(), 2);
    }

    #[test]
    fn test_duplicate_attachment_rejected() {
        let (root, _) = family();
        let (handle, _) = memory("m");
        assert!(root.add_appender(Arc::clone(&handle)));
        assert!(!root.add_appender(handle));
        assert_eq!(root.appender_names(), vec!["m".to_string()]);
    }

    struct PanickingAppender;

    impl Appender for PanickingAppender {
        fn append(&mut self, _entry: &LogEntry, _rendered: &str) -> Result<()> {
            panic!("sink exploded");
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn kind(&self) -> &str {
            "panicking"
        }
    }

    #[test]
    fn test_panic_isolation() {
        let (root, child) = family();
        root.add_appender(AppenderHandle::new("boom", PanickingAppender).shared());
        let (handle, lines) = memory("ok");
        root.add_appender(handle);

        child.error("survives");
        assert_eq!(lines.lines(), vec!["app:survives".to_string()]);
        assert_eq!(root.hierarchy.metrics.dropped_count(), 1);
    }
}
