//! Appender trait for log output destinations, and the named handle the
//! registry shares between loggers

use super::{
    error::Result, filter::LevelRangeFilter, layout::Layout, log_entry::LogEntry,
    log_level::LogLevel,
};
use parking_lot::{Mutex, RwLock};
use std::path::Path;
use std::sync::Arc;

/// An output sink. Receives every event that passed the handle's filter
/// together with the text its layout rendered.
pub trait Appender: Send + Sync {
    fn append(&mut self, entry: &LogEntry, rendered: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn kind(&self) -> &str;

    /// File the sink writes to, if any
    fn path(&self) -> Option<&Path> {
        None
    }

    /// Lines retained by sinks that keep their output in memory
    fn captured_lines(&self) -> Option<Vec<String>> {
        None
    }
}

pub type SharedAppender = Arc<AppenderHandle>;

/// A named appender with its layout and optional level filter.
///
/// Layout and filter can be swapped at runtime; every logger holding the
/// handle sees the change.
pub struct AppenderHandle {
    name: String,
    sink: Mutex<Box<dyn Appender>>,
    layout: RwLock<Layout>,
    filter: RwLock<Option<LevelRangeFilter>>,
}

impl AppenderHandle {
    pub fn new<A: Appender + 'static>(name: impl Into<String>, sink: A) -> Self {
        Self::from_boxed(name, Box::new(sink))
    }

    pub fn from_boxed(name: impl Into<String>, sink: Box<dyn Appender>) -> Self {
        Self {
            name: name.into(),
            sink: Mutex::new(sink),
            layout: RwLock::new(Layout::default()),
            filter: RwLock::new(None),
        }
    }

    #[must_use]
    pub fn with_layout(self, layout: Layout) -> Self {
        *self.layout.write() = layout;
        self
    }

    #[must_use]
    pub fn with_filter(self, filter: LevelRangeFilter) -> Self {
        *self.filter.write() = Some(filter);
        self
    }

    pub fn shared(self) -> SharedAppender {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> String {
        self.sink.lock().kind().to_string()
    }

    pub fn path(&self) -> Option<std::path::PathBuf> {
        self.sink.lock().path().map(Path::to_path_buf)
    }

    pub fn captured_lines(&self) -> Option<Vec<String>> {
        self.sink.lock().captured_lines()
    }

    pub fn layout(&self) -> Layout {
        self.layout.read().clone()
    }

    pub fn set_layout(&self, layout: Layout) {
        *self.layout.write() = layout;
    }

    pub fn filter(&self) -> Option<LevelRangeFilter> {
        *self.filter.read()
    }

    pub fn set_filter(&self, filter: Option<LevelRangeFilter>) {
        *self.filter.write() = filter;
    }

    pub fn accepts(&self, level: LogLevel) -> bool {
        match *self.filter.read() {
            Some(filter) => filter.accepts(level),
            None => level.is_emittable(),
        }
    }

    /// Render and write `entry` if the filter lets it through.
    ///
    /// Returns `Ok(false)` when the filter rejected the event.
    pub fn deliver(&self, entry: &LogEntry) -> Result<bool> {
        if !self.accepts(entry.level) {
            return Ok(false);
        }
        let rendered = self.layout.read().render(entry);
        self.sink.lock().append(entry, &rendered)?;
        Ok(true)
    }

    pub fn flush(&self) -> Result<()> {
        self.sink.lock().flush()
    }
}

impl std::fmt::Debug for AppenderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppenderHandle")
            .field("name", &self.name)
            .field("layout", &*self.layout.read())
            .field("filter", &*self.filter.read())
            .finish()
    }
}
