//! Entry points an application calls to set up its logging
//!
//! [`LogConfigurator`] binds the operations to one [`LoggerRegistry`]. The free
//! functions of this module do the same against [`LoggerRegistry::global`] and
//! take only plain strings and flags, which keeps call sites in `main` short:
//!
//! ```no_run
//! use rust_log_configurator::configurator;
//!
//! configurator::configure("/opt/app")?;
//! configurator::install_file_appenders("/var/log/app", "app", &[])?;
//! configurator::set_verbose(true, false);
//! # Ok::<(), rust_log_configurator::LoggerError>(())
//! ```

pub mod install;
pub mod log_file;
pub mod trace_bridge;
pub mod verbosity;

pub use install::FileLogSettings;
pub use trace_bridge::TraceBridge;
pub use verbosity::{TraceActivation, VerbosityFlags, VerbosityOutcome};

use crate::config::{apply_config, parse_config, ConfigSource, Platform, CONFIG_FILE_NAME};
use crate::core::error::Result;
use crate::core::registry::LoggerRegistry;
use std::path::Path;
use std::sync::Arc;

/// Names of the well-known appenders and loggers the entry points act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguratorSettings {
    pub config_file_name: String,
    pub main_appender: String,
    pub summary_appender: String,
    pub console_appender: String,
    pub trace_appender: String,
    pub trace_logger: String,
    /// Appenders whose filters survive the debug toggle
    pub debug_excluded_appenders: Vec<String>,
}

impl Default for ConfiguratorSettings {
    fn default() -> Self {
        Self {
            config_file_name: CONFIG_FILE_NAME.to_string(),
            main_appender: "MainLog".to_string(),
            summary_appender: "SummaryLog".to_string(),
            console_appender: "Console".to_string(),
            trace_appender: "TraceConsole".to_string(),
            trace_logger: "Trace".to_string(),
            debug_excluded_appenders: vec!["SummaryLog".to_string(), "TraceConsole".to_string()],
        }
    }
}

impl ConfiguratorSettings {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_main_appender(mut self, name: impl Into<String>) -> Self {
        self.main_appender = name.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_summary_appender(mut self, name: impl Into<String>) -> Self {
        self.summary_appender = name.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_console_appender(mut self, name: impl Into<String>) -> Self {
        self.console_appender = name.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_trace_appender(mut self, name: impl Into<String>) -> Self {
        self.trace_appender = name.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_trace_logger(mut self, name: impl Into<String>) -> Self {
        self.trace_logger = name.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_debug_excluded_appenders<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.debug_excluded_appenders = names.into_iter().map(Into::into).collect();
        self
    }

    /// Debug exclusion list as string slices, ready for [`LogConfigurator::set_debug`]
    pub fn debug_exclusions(&self) -> Vec<&str> {
        self.debug_excluded_appenders.iter().map(String::as_str).collect()
    }
}

/// Logging setup bound to one registry
#[derive(Debug, Clone)]
pub struct LogConfigurator {
    registry: Arc<LoggerRegistry>,
    settings: ConfiguratorSettings,
}

impl LogConfigurator {
    pub fn new(registry: Arc<LoggerRegistry>) -> Self {
        Self {
            registry,
            settings: ConfiguratorSettings::default(),
        }
    }

    /// Configurator for the process-wide registry
    pub fn global() -> Self {
        Self::new(Arc::clone(LoggerRegistry::global()))
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_settings(mut self, settings: ConfiguratorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn registry(&self) -> &Arc<LoggerRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &ConfiguratorSettings {
        &self.settings
    }

    /// Load `<install_dir>/logging.xml`, or the embedded default for this
    /// platform when the file is absent, and apply it.
    ///
    /// # Errors
    ///
    /// Unreadable or invalid documents and appenders that cannot be opened
    pub fn configure(&self, install_dir: Option<&Path>) -> Result<ConfigSource> {
        let source = self.resolve(install_dir)?;
        let config = source.load()?;
        apply_config(&self.registry, &config, &source.base_dir(install_dir))?;
        Ok(source)
    }

    /// Apply a document held in memory
    ///
    /// # Errors
    ///
    /// Same as [`LogConfigurator::configure`]
    pub fn configure_from_str(&self, xml: &str, base_dir: &Path) -> Result<()> {
        let config = parse_config(xml, "inline configuration")?;
        apply_config(&self.registry, &config, base_dir)
    }

    fn resolve(&self, install_dir: Option<&Path>) -> Result<ConfigSource> {
        if let Some(dir) = install_dir {
            let candidate = dir.join(&self.settings.config_file_name);
            if candidate.is_file() {
                return Ok(ConfigSource::File(candidate));
            }
        }
        ConfigSource::resolve(None, Platform::current())
    }
}

/// Configure the global registry from `install_dir`. An empty directory skips
/// the file lookup and goes straight to the embedded default.
///
/// # Errors
///
/// See [`LogConfigurator::configure`]
pub fn configure(install_dir: &str) -> Result<ConfigSource> {
    let dir = Some(install_dir.trim()).filter(|d| !d.is_empty()).map(Path::new);
    LogConfigurator::global().configure(dir)
}

/// See [`LogConfigurator::install_file_appenders`]
///
/// # Errors
///
/// Directory creation or log file opening failures
pub fn install_file_appenders(dir: &str, base_name: &str, excluded_loggers: &[&str]) -> Result<bool> {
    LogConfigurator::global().install_file_appenders(dir, base_name, excluded_loggers)
}

/// See [`LogConfigurator::set_debug`]
pub fn set_debug(enabled: bool, excluded_appenders: &[&str]) -> bool {
    LogConfigurator::global().set_debug(enabled, excluded_appenders)
}

/// See [`LogConfigurator::set_verbose`]
pub fn set_verbose(enabled: bool, debug: bool) -> bool {
    LogConfigurator::global().set_verbose(enabled, debug)
}

/// See [`LogConfigurator::set_trace`]
pub fn set_trace(enabled: bool) -> TraceActivation {
    LogConfigurator::global().set_trace(enabled)
}

/// See [`LogConfigurator::apply_verbosity`]
pub fn apply_verbosity(flags: VerbosityFlags, excluded_appenders: &[&str]) -> VerbosityOutcome {
    LogConfigurator::global().apply_verbosity(flags, excluded_appenders)
}

/// See [`LogConfigurator::add_log_file`]
///
/// # Errors
///
/// Directory creation or file opening failures
pub fn add_log_file(path: &str) -> Result<bool> {
    LogConfigurator::global().add_log_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use tempfile::tempdir;

    #[test]
    fn test_default_settings() {
        let settings = ConfiguratorSettings::default();
        assert_eq!(settings.config_file_name, "logging.xml");
        assert_eq!(settings.main_appender, "MainLog");
        assert_eq!(settings.trace_logger, "Trace");
        assert_eq!(settings.debug_exclusions(), vec!["SummaryLog", "TraceConsole"]);

        let settings = settings
            .with_console_appender("Screen")
            .with_debug_excluded_appenders(["Audit"]);
        assert_eq!(settings.console_appender, "Screen");
        assert_eq!(settings.debug_exclusions(), vec!["Audit"]);
    }

    #[test]
    fn test_configure_without_install_dir_uses_embedded() {
        let configurator = LogConfigurator::new(Arc::new(LoggerRegistry::new()));
        let source = configurator.configure(None).unwrap();

        assert!(source.is_embedded());
        let registry = configurator.registry();
        assert!(registry.has_appender("Console"));
        assert!(registry.has_appender("TraceConsole"));
        assert!(registry.root().has_appender("Console"));
        let trace = registry.find_logger("Trace").unwrap();
        assert!(!trace.is_additive());
        assert_eq!(trace.level(), Some(LogLevel::Trace));
    }

    #[test]
    fn test_configure_prefers_installed_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("logging.xml"),
            r#"<logging><appender name="Mem" type="memory"/><root level="WARN"><appender-ref ref="Mem"/></root></logging>"#,
        )
        .unwrap();

        let configurator = LogConfigurator::new(Arc::new(LoggerRegistry::new()));
        let source = configurator.configure(Some(dir.path())).unwrap();

        assert_eq!(source, ConfigSource::File(dir.path().join("logging.xml")));
        assert!(configurator.registry().has_appender("Mem"));
        assert!(!configurator.registry().has_appender("Console"));
        assert_eq!(configurator.registry().root().level(), Some(LogLevel::Warn));
    }

    #[test]
    fn test_invalid_installed_file_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("logging.xml"), "<logging><appender").unwrap();

        let configurator = LogConfigurator::new(Arc::new(LoggerRegistry::new()));
        assert!(configurator.configure(Some(dir.path())).is_err());
    }
}
