//! Timestamp formatting utilities
//!
//! Used by pattern layouts (`%date`, `%utcdate`) and the JSON layout.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Write};

/// Default `%date` rendering, local time with milliseconds
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Check that a strftime string contains only specifiers chrono understands
///
/// # Examples
///
/// ```
/// use rust_log_configurator::core::timestamp::is_valid_strftime;
///
/// assert!(is_valid_strftime("%Y-%m-%d %H:%M"));
/// assert!(!is_valid_strftime("%Q"));
/// ```
#[must_use]
pub fn is_valid_strftime(format_str: &str) -> bool {
    !StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error))
}

/// Render a chrono `DelayedFormat`; a failing specifier yields an empty string
fn render(formatted: impl Display) -> String {
    let mut out = String::new();
    if write!(out, "{}", formatted).is_err() {
        out.clear();
    }
    out
}

/// Standardized timestamp format options
///
/// # Examples
///
/// ```
/// use rust_log_configurator::core::TimestampFormat;
/// use chrono::Utc;
///
/// let format = TimestampFormat::Iso8601;
/// let timestamp = format.format(&Utc::now());
/// assert!(timestamp.ends_with('Z'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// ISO 8601 in UTC with milliseconds: `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// RFC 3339 format: `2025-01-08T10:30:45+00:00`
    Rfc3339,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Local time rendered with a strftime format string
    Local(String),

    /// UTC time rendered with a strftime format string
    Custom(String),
}

impl TimestampFormat {
    /// Local time in the default `%date` format
    #[must_use]
    pub fn local_default() -> Self {
        TimestampFormat::Local(DEFAULT_DATE_FORMAT.to_string())
    }

    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Local(format_str) => {
                render(datetime.with_timezone(&Local).format(format_str))
            }
            TimestampFormat::Custom(format_str) => render(datetime.format(format_str)),
        }
    }
}
