//! Layouts turn a [`LogEntry`] into the text an appender writes
//!
//! Two layouts exist:
//! - `Pattern`: a conversion pattern such as
//!   `%date [%thread] %-5level %logger - %message%newline`
//! - `Json`: one JSON object per line
//!
//! Supported conversions (long and short names):
//!
//! | name               | output                                   |
//! |--------------------|------------------------------------------|
//! | `date`, `d`        | local time, `{strftime}` option allowed  |
//! | `utcdate`          | UTC time, `{strftime}` option allowed    |
//! | `level`, `p`       | severity                                 |
//! | `logger`, `c`      | logger name                              |
//! | `message`, `m`     | message                                  |
//! | `newline`, `n`     | line break                               |
//! | `thread`, `t`      | thread name, or id when unnamed          |
//! | `file`, `F`        | source file, `?` when unknown            |
//! | `line`, `L`        | source line, `?` when unknown            |
//! | `method`, `M`      | module path of the call site             |
//!
//! Each conversion accepts log4net style padding: `%-5level` left-aligns in a
//! field of 5, `%20logger` right-aligns, `%.10logger` keeps the last 10 chars.

use super::error::{LoggerError, Result};
use super::log_entry::LogEntry;
use super::timestamp::{is_valid_strftime, TimestampFormat, DEFAULT_DATE_FORMAT};
use serde::Serialize;
use std::fmt;

/// Pattern used by file appenders unless configured otherwise
pub const DEFAULT_PATTERN: &str = "%date [%thread] %-5level %logger - %message%newline";

/// Pattern the trace toggle switches the main appender to
pub const DETAILED_PATTERN: &str =
    "%date [%thread] %-5level %logger (%file:%line in %method) - %message%newline";

/// Pattern used by console appenders unless configured otherwise
pub const CONSOLE_PATTERN: &str = "%message%newline";

/// Largest padding or truncation width a conversion may request
pub const MAX_FIELD_WIDTH: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Date,
    UtcDate,
    Level,
    Logger,
    Message,
    Newline,
    Thread,
    File,
    Line,
    Method,
}

impl Conversion {
    fn from_name(name: &str) -> Option<Self> {
        let conversion = match name {
            "date" | "d" => Conversion::Date,
            "utcdate" => Conversion::UtcDate,
            "level" | "p" => Conversion::Level,
            "logger" | "c" => Conversion::Logger,
            "message" | "m" => Conversion::Message,
            "newline" | "n" => Conversion::Newline,
            "thread" | "t" => Conversion::Thread,
            "file" | "F" => Conversion::File,
            "line" | "L" => Conversion::Line,
            "method" | "M" => Conversion::Method,
            _ => return None,
        };
        Some(conversion)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Padding {
    left_align: bool,
    min_width: usize,
    max_width: Option<usize>,
}

impl Padding {
    fn apply(&self, value: &str, out: &mut String) {
        let value = match self.max_width {
            Some(max) if value.chars().count() > max => {
                let skip = value.chars().count() - max;
                let start = value.char_indices().nth(skip).map_or(0, |(i, _)| i);
                &value[start..]
            }
            _ => value,
        };

        let len = value.chars().count();
        if len >= self.min_width {
            out.push_str(value);
            return;
        }

        let fill = " ".repeat(self.min_width - len);
        if self.left_align {
            out.push_str(value);
            out.push_str(&fill);
        } else {
            out.push_str(&fill);
            out.push_str(value);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field {
        conversion: Conversion,
        padding: Padding,
        date_format: Option<TimestampFormat>,
    },
}

/// A parsed conversion pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternLayout {
    pattern: String,
    segments: Vec<Segment>,
}

impl PatternLayout {
    /// Parse a conversion pattern
    ///
    /// # Errors
    ///
    /// Returns an error on unknown conversion names or unterminated options
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_log_configurator::core::PatternLayout;
    ///
    /// let layout = PatternLayout::parse("%-5level %message%newline").unwrap();
    /// assert_eq!(layout.pattern(), "%-5level %message%newline");
    /// assert!(PatternLayout::parse("%bogus").is_err());
    /// ```
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }

            if chars.peek() == Some(&'%') {
                chars.next();
                literal.push('%');
                continue;
            }

            let mut padding = Padding::default();
            if chars.peek() == Some(&'-') {
                chars.next();
                padding.left_align = true;
            }
            padding.min_width = take_width(&mut chars, pattern)?.unwrap_or(0);
            if chars.peek() == Some(&'.') {
                chars.next();
                padding.max_width = take_width(&mut chars, pattern)?;
            }

            let mut name = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_ascii_alphabetic() {
                    name.push(next);
                    chars.next();
                } else {
                    break;
                }
            }

            let conversion = Conversion::from_name(&name).ok_or_else(|| {
                LoggerError::config(
                    "pattern layout",
                    format!("unknown conversion '%{}' in '{}'", name, pattern),
                )
            })?;

            let mut option = None;
            if chars.peek() == Some(&'{') {
                chars.next();
                let mut body = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => body.push(ch),
                        None => {
                            return Err(LoggerError::config(
                                "pattern layout",
                                format!("unterminated option for '%{}' in '{}'", name, pattern),
                            ))
                        }
                    }
                }
                option = Some(body);
            }

            if let (Conversion::Date | Conversion::UtcDate, Some(format_str)) =
                (conversion, option.as_deref())
            {
                if !is_valid_strftime(format_str) {
                    return Err(LoggerError::config(
                        "pattern layout",
                        format!("invalid date format '{}' in '{}'", format_str, pattern),
                    ));
                }
            }

            let date_format = match conversion {
                Conversion::Date => Some(TimestampFormat::Local(
                    option.unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string()),
                )),
                Conversion::UtcDate => Some(match option {
                    Some(format_str) => TimestampFormat::Custom(format_str),
                    None => TimestampFormat::Iso8601,
                }),
                _ => None,
            };

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Field {
                conversion,
                padding,
                date_format,
            });
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn render(&self, entry: &LogEntry) -> String {
        let mut out = String::with_capacity(self.pattern.len() + entry.message.len() + 32);

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field {
                    conversion,
                    padding,
                    date_format,
                } => {
                    let value = match conversion {
                        Conversion::Date | Conversion::UtcDate => date_format
                            .as_ref()
                            .map(|f| f.format(&entry.timestamp))
                            .unwrap_or_default(),
                        Conversion::Level => entry.level.to_str().to_string(),
                        Conversion::Logger => entry.logger.clone(),
                        Conversion::Message => entry.message.clone(),
                        Conversion::Newline => "\n".to_string(),
                        Conversion::Thread => entry.thread_label().to_string(),
                        Conversion::File => entry.file.clone().unwrap_or_else(|| "?".to_string()),
                        Conversion::Line => entry
                            .line
                            .map(|l| l.to_string())
                            .unwrap_or_else(|| "?".to_string()),
                        Conversion::Method => entry
                            .module_path
                            .clone()
                            .unwrap_or_else(|| "?".to_string()),
                    };
                    padding.apply(&value, &mut out);
                }
            }
        }

        out
    }
}

impl Default for PatternLayout {
    fn default() -> Self {
        Self::parse(DEFAULT_PATTERN).unwrap_or_else(|_| Self {
            pattern: DEFAULT_PATTERN.to_string(),
            segments: Vec::new(),
        })
    }
}

fn take_width(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    pattern: &str,
) -> Result<Option<usize>> {
    let mut digits = String::new();
    while let Some(&next) = chars.peek() {
        if next.is_ascii_digit() {
            digits.push(next);
            chars.next();
        } else {
            break;
        }
    }
    if digits.is_empty() {
        return Ok(None);
    }

    match digits.parse::<usize>() {
        Ok(width) if width <= MAX_FIELD_WIDTH => Ok(Some(width)),
        _ => Err(LoggerError::config(
            "pattern layout",
            format!(
                "field width {} exceeds {} in '{}'",
                digits, MAX_FIELD_WIDTH, pattern
            ),
        )),
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    timestamp: String,
    level: &'static str,
    logger: &'a str,
    message: &'a str,
    thread: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    module_path: Option<&'a str>,
}

/// Rendering strategy of an appender
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    Pattern(PatternLayout),
    /// One JSON object per event, newline terminated
    Json,
}

impl Layout {
    /// Parse a pattern layout
    ///
    /// # Errors
    ///
    /// See [`PatternLayout::parse`]
    pub fn pattern(pattern: &str) -> Result<Self> {
        PatternLayout::parse(pattern).map(Layout::Pattern)
    }

    pub fn render(&self, entry: &LogEntry) -> String {
        match self {
            Layout::Pattern(pattern) => pattern.render(entry),
            Layout::Json => {
                let record = JsonRecord {
                    timestamp: TimestampFormat::Iso8601.format(&entry.timestamp),
                    level: entry.level.to_str(),
                    logger: &entry.logger,
                    message: &entry.message,
                    thread: entry.thread_label(),
                    file: entry.file.as_deref(),
                    line: entry.line,
                    module_path: entry.module_path.as_deref(),
                };
                let mut line = serde_json::to_string(&record).unwrap_or_default();
                line.push('\n');
                line
            }
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Pattern(PatternLayout::default())
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Pattern(pattern) => write!(f, "pattern({})", pattern.pattern()),
            Layout::Json => write!(f, "json"),
        }
    }
}
