//! Logging configuration: locating, parsing and applying the XML document

pub mod apply;
pub mod source;
pub mod xml;

pub use apply::{apply_config, build_appender};
pub use source::{embedded_resource, ConfigSource, Platform, CONFIG_FILE_NAME};
pub use xml::{parse_config, AppenderConfig, AppenderKind, LoggerConfig, LoggingConfig};
