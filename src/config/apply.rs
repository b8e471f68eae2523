//! Turning a parsed document into registry state

use super::xml::{AppenderConfig, AppenderKind, LoggingConfig};
use crate::appenders::{
    ConsoleAppender, FileAppender, LockingModel, MemoryAppender, RollingFileAppender, RollingPolicy,
};
use crate::core::appender::{AppenderHandle, SharedAppender};
use crate::core::error::{LoggerError, Result};
use crate::core::layout::{Layout, CONSOLE_PATTERN};
use crate::core::registry::LoggerRegistry;
use std::path::Path;

/// Build the appender an `<appender>` element describes. Relative file paths
/// are resolved against `base_dir`.
///
/// # Errors
///
/// Fails when a file cannot be opened or locked
pub fn build_appender(config: &AppenderConfig, base_dir: &Path) -> Result<SharedAppender> {
    let file_path = || {
        config
            .file
            .as_deref()
            .map(|file| base_dir.join(file))
            .ok_or_else(|| LoggerError::config(format!("appender '{}'", config.name), "missing 'file' attribute"))
    };

    let handle = match config.kind {
        AppenderKind::Console => AppenderHandle::new(
            &config.name,
            ConsoleAppender::new()
                .with_target(config.target)
                .with_colors(config.colors),
        ),
        AppenderKind::File => AppenderHandle::new(
            &config.name,
            FileAppender::with_options(
                file_path()?,
                config.locking.unwrap_or(LockingModel::Exclusive),
                config.append,
            )?,
        ),
        AppenderKind::RollingFile => {
            let policy = RollingPolicy::new()
                .with_style(config.rolling_style)
                .with_max_backups(config.max_backups)
                .with_compression(config.compress)
                .with_locking(config.locking.unwrap_or(LockingModel::Minimal))
                .with_append(config.append);
            AppenderHandle::new(&config.name, RollingFileAppender::with_policy(file_path()?, policy)?)
        }
        AppenderKind::Memory => AppenderHandle::new(&config.name, MemoryAppender::new()),
    };

    let layout = match (&config.layout, config.kind) {
        (Some(layout), _) => layout.clone(),
        (None, AppenderKind::Console) => Layout::pattern(CONSOLE_PATTERN)?,
        (None, _) => Layout::default(),
    };
    let handle = handle.with_layout(layout);
    let handle = match config.filter {
        Some(filter) => handle.with_filter(filter),
        None => handle,
    };
    Ok(handle.shared())
}

/// Replace the registry's configuration with `config`.
///
/// The registry is reset first, so appenders from an earlier configuration
/// release their files before the new ones open them.
///
/// # Errors
///
/// Appender construction failures; the registry is left reset in that case
pub fn apply_config(registry: &LoggerRegistry, config: &LoggingConfig, base_dir: &Path) -> Result<()> {
    registry.reset_configuration();

    for appender in &config.appenders {
        registry.register_appender(build_appender(appender, base_dir)?)?;
    }

    if let Some(threshold) = config.threshold {
        registry.set_threshold(threshold);
    }

    for logger_config in config.root.iter().chain(config.loggers.iter()) {
        let logger = registry.logger(&logger_config.name);
        if logger_config.level.is_some() || logger.is_root() {
            logger.set_level(logger_config.level.or(logger.level()));
        }
        if !logger.is_root() {
            logger.set_additive(logger_config.additive);
        }
        for reference in &logger_config.appender_refs {
            let appender = registry
                .appender(reference)
                .ok_or_else(|| LoggerError::unknown_appender(reference))?;
            logger.add_appender(appender);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::xml::parse_config;
    use crate::core::log_level::LogLevel;
    use tempfile::tempdir;

    const DOC: &str = r#"<logging threshold="DEBUG">
  <appender name="Mem" type="memory">
    <layout pattern="%level %logger %message" />
    <filter min="INFO" />
  </appender>
  <appender name="Disk" type="rolling-file" file="logs/app.log" max-size="1KB" max-backups="2" />
  <root level="INFO"><appender-ref ref="Mem" /></root>
  <logger name="db" level="DEBUG" additivity="false">
    <appender-ref ref="Disk" />
  </logger>
</logging>"#;

    #[test]
    fn test_apply_wires_registry() {
        let dir = tempdir().unwrap();
        let registry = LoggerRegistry::new();
        let config = parse_config(DOC, "doc.xml").unwrap();

        apply_config(&registry, &config, dir.path()).unwrap();

        assert_eq!(registry.threshold(), LogLevel::Debug);
        assert_eq!(registry.root().level(), Some(LogLevel::Info));
        assert_eq!(registry.root().appender_names(), vec!["Mem".to_string()]);

        let db = registry.logger("db");
        assert_eq!(db.level(), Some(LogLevel::Debug));
        assert!(!db.is_additive());

        let disk = registry.appender("Disk").unwrap();
        assert_eq!(disk.kind(), "rolling-file");
        assert_eq!(disk.path(), Some(dir.path().join("logs").join("app.log")));
        assert!(dir.path().join("logs").join("app.log").exists());

        registry.logger("web").info("request served");
        registry.logger("web").debug("hidden by root level");
        db.debug("query ran");

        let lines = registry.appender("Mem").unwrap().captured_lines().unwrap();
        assert_eq!(lines, vec!["INFO web request served".to_string()]);

        registry.flush_all().unwrap();
        let disk_content = std::fs::read_to_string(dir.path().join("logs").join("app.log")).unwrap();
        assert!(disk_content.contains("query ran"));
    }

    #[test]
    fn test_reapply_replaces_previous_configuration() {
        let dir = tempdir().unwrap();
        let registry = LoggerRegistry::new();
        apply_config(&registry, &parse_config(DOC, "doc.xml").unwrap(), dir.path()).unwrap();

        let second = parse_config(
            r#"<logging><appender name="Other" type="memory"/><root><appender-ref ref="Other"/></root></logging>"#,
            "second.xml",
        )
        .unwrap();
        apply_config(&registry, &second, dir.path()).unwrap();

        assert!(registry.appender("Mem").is_none());
        assert!(registry.appender("Disk").is_none());
        assert_eq!(registry.root().appender_names(), vec!["Other".to_string()]);
        assert_eq!(registry.logger("db").level(), None);
        assert!(registry.logger("db").is_additive());
        assert_eq!(registry.threshold(), LogLevel::Trace);
    }

    #[test]
    fn test_console_gets_console_pattern_by_default() {
        let config = parse_config(r#"<logging><appender name="C" type="console"/></logging>"#, "c.xml").unwrap();
        let handle = build_appender(&config.appenders[0], Path::new(".")).unwrap();
        assert_eq!(handle.layout(), Layout::pattern(CONSOLE_PATTERN).unwrap());
    }
}
