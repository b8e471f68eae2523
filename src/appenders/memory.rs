//! In-memory appender
//!
//! Keeps every rendered event so callers can inspect what was logged.

use crate::core::{Appender, LogEntry, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable view of the lines a [`MemoryAppender`] captured
#[derive(Debug, Clone, Default)]
pub struct MemoryBuffer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryBuffer {
    /// Captured lines without their trailing line break
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|line| line.contains(needle))
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

#[derive(Debug, Default)]
pub struct MemoryAppender {
    buffer: MemoryBuffer,
}

impl MemoryAppender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the captured lines; stays valid after the appender is boxed
    pub fn buffer(&self) -> MemoryBuffer {
        self.buffer.clone()
    }
}

impl Appender for MemoryAppender {
    fn append(&mut self, _entry: &LogEntry, rendered: &str) -> Result<()> {
        let line = rendered.strip_suffix('\n').unwrap_or(rendered);
        self.buffer.lines.lock().push(line.to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn kind(&self) -> &str {
        "memory"
    }

    fn captured_lines(&self) -> Option<Vec<String>> {
        Some(self.buffer.lines())
    }
}
