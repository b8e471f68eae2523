//! Console appender implementation

use crate::core::{Appender, LogEntry, LogLevel, Result};
#[cfg(feature = "console")]
use colored::Colorize;
use std::io::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleTarget {
    /// Stdout, with Error and Fatal routed to stderr
    #[default]
    Stdout,
    Stderr,
}

impl FromStr for ConsoleTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stdout" | "console.out" | "out" => Ok(ConsoleTarget::Stdout),
            "stderr" | "console.error" | "err" => Ok(ConsoleTarget::Stderr),
            _ => Err(format!("Invalid console target: '{}'", s)),
        }
    }
}

pub struct ConsoleAppender {
    target: ConsoleTarget,
    use_colors: bool,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self {
            target: ConsoleTarget::Stdout,
            use_colors: true,
        }
    }

    /// # Example
    ///
    /// ```
    /// use rust_log_configurator::appenders::{ConsoleAppender, ConsoleTarget};
    ///
    /// let appender = ConsoleAppender::new()
    ///     .with_target(ConsoleTarget::Stderr)
    ///     .with_colors(false);
    /// ```
    #[must_use]
    pub fn with_target(mut self, target: ConsoleTarget) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }

    fn paint(&self, level: LogLevel, rendered: &str) -> String {
        if !self.use_colors {
            return rendered.to_string();
        }
        colorize(level, rendered)
    }
}

#[cfg(feature = "console")]
fn colorize(level: LogLevel, rendered: &str) -> String {
    // Keep the line break outside the escape sequence
    let body = rendered.trim_end_matches('\n');
    let tail = &rendered[body.len()..];
    format!("{}{}", body.color(level.color_code()), tail)
}

#[cfg(not(feature = "console"))]
fn colorize(_level: LogLevel, rendered: &str) -> String {
    rendered.to_string()
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, entry: &LogEntry, rendered: &str) -> Result<()> {
        let output = self.paint(entry.level, rendered);

        let to_stderr = match self.target {
            ConsoleTarget::Stderr => true,
            ConsoleTarget::Stdout => matches!(entry.level, LogLevel::Error | LogLevel::Fatal),
        };

        if to_stderr {
            std::io::stderr().lock().write_all(output.as_bytes())?;
        } else {
            std::io::stdout().lock().write_all(output.as_bytes())?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Flush both since errors are routed to stderr
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn kind(&self) -> &str {
        "console"
    }
}
