//! XML logging configuration documents
//!
//! ```xml
//! <logging threshold="ALL">
//!   <appender name="Main" type="rolling-file" file="logs/app.log"
//!             max-size="10MB" max-backups="50" locking="minimal">
//!     <layout pattern="%date %-5level %logger - %message%newline" />
//!     <filter min="INFO" max="FATAL" />
//!   </appender>
//!   <root level="DEBUG"><appender-ref ref="Main" /></root>
//!   <logger name="Trace" level="TRACE" additivity="false" />
//! </logging>
//! ```
//!
//! log4net documents are accepted too: the `log4net` root element, dotted
//! type names such as `log4net.Appender.RollingFileAppender`, and settings
//! given as child elements (`<file value=".."/>`, `<maximumFileSize
//! value=".."/>`, `<param name=".." value=".."/>`, `<lockingModel
//! type="..+MinimalLock"/>`, `<conversionPattern value=".."/>` inside a
//! layout, `<levelMin value=".."/>` inside a filter). An attribute on the
//! element itself wins over a child element of the same name. Only the
//! conversions listed in [`crate::core::layout`] are understood in patterns.

use crate::appenders::{parse_size, ConsoleTarget, LockingModel, RollingStyle, DEFAULT_MAX_BACKUPS, DEFAULT_MAX_FILE_SIZE};
use crate::core::error::{LoggerError, Result};
use crate::core::filter::LevelRangeFilter;
use crate::core::layout::Layout;
use crate::core::log_level::LogLevel;
use crate::core::registry::ROOT_LOGGER;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppenderKind {
    Console,
    File,
    RollingFile,
    Memory,
}

impl FromStr for AppenderKind {
    type Err = String;

    /// Accepts `rolling-file`, `RollingFile` and `log4net.Appender.RollingFileAppender`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let short = s.rsplit('.').next().unwrap_or(s).to_lowercase().replace(['-', '_'], "");
        let short = short.strip_suffix("appender").unwrap_or(short.as_str());
        match short {
            "console" | "coloredconsole" | "managedcoloredconsole" => Ok(AppenderKind::Console),
            "file" => Ok(AppenderKind::File),
            "rollingfile" => Ok(AppenderKind::RollingFile),
            "memory" => Ok(AppenderKind::Memory),
            _ => Err(format!("Unknown appender type: '{}'", s)),
        }
    }
}

/// One `<appender>` element
#[derive(Debug, Clone, PartialEq)]
pub struct AppenderConfig {
    pub name: String,
    pub kind: AppenderKind,
    /// Target file for file based kinds, relative paths resolved later
    pub file: Option<String>,
    pub append: bool,
    /// `None` picks the kind's default model
    pub locking: Option<LockingModel>,
    pub rolling_style: RollingStyle,
    pub max_backups: usize,
    pub compress: bool,
    pub target: ConsoleTarget,
    pub colors: bool,
    /// `None` picks the kind's default layout
    pub layout: Option<Layout>,
    pub filter: Option<LevelRangeFilter>,
}

impl AppenderConfig {
    pub fn new(name: impl Into<String>, kind: AppenderKind) -> Self {
        Self {
            name: name.into(),
            kind,
            file: None,
            append: true,
            locking: None,
            rolling_style: RollingStyle::default(),
            max_backups: DEFAULT_MAX_BACKUPS,
            compress: false,
            target: ConsoleTarget::default(),
            colors: true,
            layout: None,
            filter: None,
        }
    }
}

/// `<root>` or `<logger>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub name: String,
    pub level: Option<LogLevel>,
    pub additive: bool,
    pub appender_refs: Vec<String>,
}

impl LoggerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: None,
            additive: true,
            appender_refs: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.name == ROOT_LOGGER
    }
}

/// Parsed configuration document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoggingConfig {
    pub threshold: Option<LogLevel>,
    pub appenders: Vec<AppenderConfig>,
    pub root: Option<LoggerConfig>,
    pub loggers: Vec<LoggerConfig>,
}

impl LoggingConfig {
    pub fn appender(&self, name: &str) -> Option<&AppenderConfig> {
        self.appenders.iter().find(|a| a.name == name)
    }

    pub fn logger(&self, name: &str) -> Option<&LoggerConfig> {
        if name == ROOT_LOGGER {
            return self.root.as_ref();
        }
        self.loggers.iter().find(|l| l.name == name)
    }

    /// Appender names must be unique and every reference must resolve
    fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for appender in &self.appenders {
            if !names.insert(appender.name.as_str()) {
                return Err(LoggerError::duplicate_appender(&appender.name));
            }
        }

        for logger in self.root.iter().chain(self.loggers.iter()) {
            for reference in &logger.appender_refs {
                if !names.contains(reference.as_str()) {
                    return Err(LoggerError::config(
                        format!("logger '{}'", logger.name),
                        format!("references undeclared appender '{}'", reference),
                    ));
                }
            }
        }
        Ok(())
    }
}

type Attributes = HashMap<String, String>;

fn read_attributes(element: &BytesStart<'_>, source_name: &str) -> Result<Attributes> {
    let mut attributes = HashMap::new();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| LoggerError::parse(source_name, e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| LoggerError::parse(source_name, e.to_string()))?
            .into_owned();
        attributes.insert(key, value);
    }
    Ok(attributes)
}

/// First present attribute among `keys`
fn attr<'a>(attributes: &'a Attributes, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| attributes.get(*k).map(String::as_str))
}

fn parse_attr<T>(attributes: &Attributes, keys: &[&str], component: &str) -> Result<Option<T>>
where
    T: FromStr<Err = String>,
{
    attr(attributes, keys)
        .map(|value| value.parse::<T>().map_err(|e| LoggerError::config(component, e)))
        .transpose()
}

fn parse_bool(attributes: &Attributes, keys: &[&str], component: &str) -> Result<Option<bool>> {
    attr(attributes, keys)
        .map(|value| match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(LoggerError::config(
                component,
                format!("expected a boolean, found '{}'", value),
            )),
        })
        .transpose()
}

fn appender_from(attributes: &Attributes) -> Result<AppenderConfig> {
    let name = attr(attributes, &["name"])
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| LoggerError::config("appender", "missing 'name' attribute"))?;
    let component = format!("appender '{}'", name);

    let kind: AppenderKind = parse_attr(attributes, &["type"], &component)?
        .ok_or_else(|| LoggerError::config(&component, "missing 'type' attribute"))?;
    let mut config = AppenderConfig::new(name, kind);

    config.file = attr(attributes, &["file"]).map(str::to_string);
    if matches!(kind, AppenderKind::File | AppenderKind::RollingFile) && config.file.is_none() {
        return Err(LoggerError::config(&component, "missing 'file' setting"));
    }

    if let Some(append) = parse_bool(attributes, &["append", "appendToFile"], &component)? {
        config.append = append;
    }
    config.locking = parse_attr(attributes, &["locking", "lockingModel"], &component)?;

    let max_bytes = attr(attributes, &["max-size", "maximumFileSize"])
        .map(|v| parse_size(v).map_err(|e| LoggerError::config(&component, e)))
        .transpose()?
        .unwrap_or(DEFAULT_MAX_FILE_SIZE);
    config.rolling_style = match attr(attributes, &["rolling-style", "rollingStyle"]) {
        Some(style) => RollingStyle::parse(style, max_bytes).map_err(|e| LoggerError::config(&component, e))?,
        None => RollingStyle::size(max_bytes),
    };
    if let Some(backups) = attr(attributes, &["max-backups", "maxSizeRollBackups"]) {
        config.max_backups = backups.trim().parse().map_err(|_| {
            LoggerError::config(&component, format!("invalid backup count '{}'", backups))
        })?;
    }
    if let Some(compress) = parse_bool(attributes, &["compress"], &component)? {
        config.compress = compress;
    }

    if let Some(target) = parse_attr(attributes, &["target"], &component)? {
        config.target = target;
    }
    if let Some(colors) = parse_bool(attributes, &["colors"], &component)? {
        config.colors = colors;
    }

    Ok(config)
}

fn layout_from(attributes: &Attributes, component: &str) -> Result<Layout> {
    if attr(attributes, &["type"]).is_some_and(|t| t.eq_ignore_ascii_case("json")) {
        return Ok(Layout::Json);
    }
    let pattern = attr(attributes, &["pattern", "conversionPattern", "value"])
        .ok_or_else(|| LoggerError::config(component, "layout needs a 'pattern' or type=\"json\""))?;
    Layout::pattern(pattern)
}

fn filter_from(attributes: &Attributes, component: &str) -> Result<LevelRangeFilter> {
    let min = parse_attr(attributes, &["min", "levelMin"], component)?;
    let max = parse_attr(attributes, &["max", "levelMax"], component)?;
    Ok(LevelRangeFilter::new(min, max))
}

fn logger_from(attributes: &Attributes, is_root: bool) -> Result<LoggerConfig> {
    let name = if is_root {
        ROOT_LOGGER.to_string()
    } else {
        attr(attributes, &["name"])
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| LoggerError::config("logger", "missing 'name' attribute"))?
            .to_string()
    };
    let component = format!("logger '{}'", name);

    let mut config = LoggerConfig::new(name);
    config.level = parse_attr(attributes, &["level"], &component)?;
    if let Some(additive) = parse_bool(attributes, &["additivity"], &component)? {
        config.additive = additive;
    }
    if is_root {
        config.additive = false;
    }
    Ok(config)
}

/// Nested section of an appender whose settings are still being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Layout,
    Filter,
}

/// An `<appender>` whose attributes and child settings are merged on close
#[derive(Default)]
struct PendingAppender {
    attributes: Attributes,
    layout: Option<Attributes>,
    filters: Vec<Attributes>,
    section: Option<Section>,
}

impl PendingAppender {
    /// Record a child element such as `<file value=".."/>`, keeping any
    /// attribute already set for the same key
    fn child(&mut self, name: &str, attributes: &Attributes) {
        let (key, value) = if name == "param" {
            match (attr(attributes, &["name"]), attr(attributes, &["value"])) {
                (Some(key), Some(value)) => (key, value),
                _ => return,
            }
        } else {
            match attr(attributes, &["value", "type"]) {
                Some(value) => (name, value),
                None => return,
            }
        };

        let target = match self.section {
            Some(Section::Layout) => self.layout.get_or_insert_with(Attributes::new),
            Some(Section::Filter) => match self.filters.last_mut() {
                Some(filter) => filter,
                None => return,
            },
            None => &mut self.attributes,
        };
        // `<param name="RollingStyle">` names settings with a leading capital
        let mut chars = key.chars();
        let key = match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => return,
        };
        target.entry(key).or_insert_with(|| value.to_string());
    }

    fn finish(self) -> Result<AppenderConfig> {
        let mut config = appender_from(&self.attributes)?;
        let component = format!("appender '{}'", config.name);

        if let Some(layout) = &self.layout {
            config.layout = Some(layout_from(layout, &component)?);
        }
        for filter in self.filters.iter().filter(|f| is_level_filter(f)) {
            config.filter = Some(filter_from(filter, &component)?);
        }
        Ok(config)
    }
}

/// log4net chains filters; only level filters map onto a [`LevelRangeFilter`]
fn is_level_filter(attributes: &Attributes) -> bool {
    attr(attributes, &["type"]).map_or(true, |t| {
        let short = t.rsplit('.').next().unwrap_or(t).to_lowercase();
        short.starts_with("levelrange") || short.starts_with("levelmatch")
    })
}

/// Which element the parser is currently inside
#[derive(Default)]
struct ParseState {
    config: LoggingConfig,
    seen_document: bool,
    appender: Option<PendingAppender>,
    logger: Option<LoggerConfig>,
}

impl ParseState {
    fn open(&mut self, name: &str, attributes: &Attributes) -> Result<()> {
        if let Some(appender) = self.appender.as_mut() {
            match (name, appender.section) {
                ("layout", None) => {
                    appender.layout = Some(attributes.clone());
                    appender.section = Some(Section::Layout);
                }
                ("filter", None) => {
                    appender.filters.push(attributes.clone());
                    appender.section = Some(Section::Filter);
                }
                _ => appender.child(name, attributes),
            }
            return Ok(());
        }

        match name {
            "logging" | "log4net" => {
                self.seen_document = true;
                self.config.threshold = parse_attr(attributes, &["threshold"], "logging")?;
            }
            "appender" => {
                self.appender = Some(PendingAppender {
                    attributes: attributes.clone(),
                    ..PendingAppender::default()
                })
            }
            "root" => self.logger = Some(logger_from(attributes, true)?),
            "logger" => self.logger = Some(logger_from(attributes, false)?),
            "level" => {
                if let Some(logger) = self.logger.as_mut() {
                    let component = format!("logger '{}'", logger.name);
                    logger.level = parse_attr(attributes, &["value"], &component)?;
                }
            }
            "appender-ref" => {
                if let Some(logger) = self.logger.as_mut() {
                    let reference = attr(attributes, &["ref"]).ok_or_else(|| {
                        LoggerError::config(format!("logger '{}'", logger.name), "appender-ref without 'ref'")
                    })?;
                    logger.appender_refs.push(reference.to_string());
                }
            }
            // Unknown elements are tolerated so documents can carry extra sections
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        if let Some(appender) = self.appender.as_mut() {
            match (name, appender.section) {
                ("layout", Some(Section::Layout)) | ("filter", Some(Section::Filter)) => {
                    appender.section = None;
                }
                ("appender", None) => {
                    if let Some(pending) = self.appender.take() {
                        self.config.appenders.push(pending.finish()?);
                    }
                }
                _ => {}
            }
            return Ok(());
        }

        match name {
            "root" => self.config.root = self.logger.take(),
            "logger" => {
                if let Some(logger) = self.logger.take() {
                    self.config.loggers.push(logger);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Parse a configuration document. `source_name` only labels errors.
///
/// # Errors
///
/// [`LoggerError::ConfigParse`] for malformed XML,
/// [`LoggerError::InvalidConfiguration`] or [`LoggerError::DuplicateAppender`]
/// for well-formed documents with invalid content.
pub fn parse_config(xml: &str, source_name: &str) -> Result<LoggingConfig> {
    let mut reader = Reader::from_str(xml);
    let mut state = ParseState::default();
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                depth += 1;
                let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
                state.open(&name, &read_attributes(&element, source_name)?)?;
            }
            Ok(Event::Empty(element)) => {
                let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
                state.open(&name, &read_attributes(&element, source_name)?)?;
                state.close(&name)?;
            }
            Ok(Event::End(element)) => {
                depth = depth.saturating_sub(1);
                let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
                state.close(&name)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(LoggerError::parse(
                    source_name,
                    format!("{} at byte {}", e, reader.buffer_position()),
                ))
            }
        }
    }

    if depth != 0 {
        return Err(LoggerError::parse(source_name, "unexpected end of document"));
    }
    if !state.seen_document {
        return Err(LoggerError::parse(source_name, "missing <logging> element"));
    }

    state.config.validate()?;
    Ok(state.config)
}
