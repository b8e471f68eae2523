//! Where the logging configuration comes from
//!
//! An installed `logging.xml` wins; without one the default compiled into the
//! binary for the current platform is used.

use super::xml::{parse_config, LoggingConfig};
use crate::core::error::{LoggerError, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up in the install directory
pub const CONFIG_FILE_NAME: &str = "logging.xml";

/// Default documents compiled into the binary, keyed by resource name
static EMBEDDED_RESOURCES: &[(&str, &str)] = &[
    ("logging.xml", include_str!("../../resources/logging.xml")),
    ("logging.linux.xml", include_str!("../../resources/logging.linux.xml")),
    ("logging.macos.xml", include_str!("../../resources/logging.macos.xml")),
];

/// Platform used to select an embedded default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Primary target, uses the unmarked resource
    Windows,
    Linux,
    MacOs,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            // Other unix-like targets share the linux defaults
            Platform::Linux
        }
    }

    /// Marker inserted into resource names, `None` on the primary target
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            Platform::Windows => None,
            Platform::Linux => Some("linux"),
            Platform::MacOs => Some("macos"),
        }
    }

    /// `logging.xml` on the primary target, `logging.<marker>.xml` elsewhere
    pub fn resource_name(&self) -> String {
        match self.marker() {
            None => CONFIG_FILE_NAME.to_string(),
            Some(marker) => match CONFIG_FILE_NAME.rsplit_once('.') {
                Some((stem, extension)) => format!("{}.{}.{}", stem, marker, extension),
                None => format!("{}.{}", CONFIG_FILE_NAME, marker),
            },
        }
    }
}

/// Look up a compiled-in configuration document
pub fn embedded_resource(name: &str) -> Option<&'static str> {
    EMBEDDED_RESOURCES
        .iter()
        .find(|(resource, _)| *resource == name)
        .map(|(_, content)| *content)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Embedded { name: String, content: &'static str },
}

impl ConfigSource {
    /// Pick the installed file when present, otherwise the platform default
    ///
    /// # Errors
    ///
    /// Only if no embedded resource exists for `platform`
    pub fn resolve(install_dir: Option<&Path>, platform: Platform) -> Result<Self> {
        if let Some(dir) = install_dir {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Ok(ConfigSource::File(candidate));
            }
        }

        let name = platform.resource_name();
        let content = embedded_resource(&name).ok_or_else(|| {
            LoggerError::config("embedded configuration", format!("no resource named '{}'", name))
        })?;
        Ok(ConfigSource::Embedded { name, content })
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, ConfigSource::Embedded { .. })
    }

    /// Directory relative file paths in the document are resolved against
    pub fn base_dir(&self, install_dir: Option<&Path>) -> PathBuf {
        match self {
            ConfigSource::File(path) => path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            ConfigSource::Embedded { .. } => install_dir.map(Path::to_path_buf).unwrap_or_default(),
        }
    }

    /// Read and parse the document
    ///
    /// # Errors
    ///
    /// IO errors reading the file, and everything [`parse_config`] reports
    pub fn load(&self) -> Result<LoggingConfig> {
        match self {
            ConfigSource::File(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    LoggerError::io_operation(
                        "read logging configuration",
                        format!("Failed to read '{}'", path.display()),
                        e,
                    )
                })?;
                parse_config(&content, &path.display().to_string())
            }
            ConfigSource::Embedded { name, content } => parse_config(content, name),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "file {}", path.display()),
            ConfigSource::Embedded { name, .. } => write!(f, "embedded {}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resource_names() {
        assert_eq!(Platform::Windows.resource_name(), "logging.xml");
        assert_eq!(Platform::Linux.resource_name(), "logging.linux.xml");
        assert_eq!(Platform::MacOs.resource_name(), "logging.macos.xml");
    }

    #[test]
    fn test_every_platform_has_a_parsable_default() {
        for platform in [Platform::Windows, Platform::Linux, Platform::MacOs] {
            let source = ConfigSource::resolve(None, platform).unwrap();
            assert!(source.is_embedded());
            let config = source.load().unwrap();
            assert!(config.appender("Console").is_some());
            assert!(config.appender("TraceConsole").is_some());
            assert!(config.logger("Trace").is_some());
        }
    }

    #[test]
    fn test_installed_file_wins() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "<logging/>").unwrap();

        let source = ConfigSource::resolve(Some(dir.path()), Platform::Linux).unwrap();
        assert_eq!(source, ConfigSource::File(dir.path().join(CONFIG_FILE_NAME)));
        assert_eq!(source.base_dir(Some(dir.path())), dir.path());
        assert!(source.load().unwrap().appenders.is_empty());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempdir().unwrap();
        let source = ConfigSource::resolve(Some(dir.path()), Platform::Windows).unwrap();
        assert!(matches!(source, ConfigSource::Embedded { ref name, .. } if name == "logging.xml"));
        assert_eq!(source.base_dir(Some(dir.path())), dir.path());
        assert_eq!(source.to_string(), "embedded logging.xml");
    }

    #[test]
    fn test_unknown_resource() {
        assert!(embedded_resource("logging.beos.xml").is_none());
    }
}
