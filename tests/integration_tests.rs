//! Integration tests for the logging configurator
//!
//! These tests verify:
//! - Configuration from an installed file and from the embedded default
//! - Rolling file installation and level split between main and summary logs
//! - Debug, verbose and trace toggles on a configured registry
//! - Ad-hoc log files
//! - Log injection prevention
//! - The process-wide entry points

use rust_log_configurator::configurator::{self, VerbosityFlags};
use rust_log_configurator::core::layout::DETAILED_PATTERN;
use rust_log_configurator::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const APP_CONFIG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<logging threshold="ALL">
  <appender name="Console" type="memory">
    <layout pattern="%-5level %message" />
    <filter min="WARN" />
  </appender>
  <appender name="TraceConsole" type="memory">
    <layout pattern="%level %message" />
    <filter min="OFF" />
  </appender>
  <root level="INFO">
    <appender-ref ref="Console" />
  </root>
  <logger name="Trace" level="TRACE" additivity="false">
    <appender-ref ref="TraceConsole" />
  </logger>
</logging>"#;

fn installed(dir: &Path) -> LogConfigurator {
    fs::write(dir.join("logging.xml"), APP_CONFIG).expect("Failed to write config");
    let configurator = LogConfigurator::new(Arc::new(LoggerRegistry::new()));
    let source = configurator.configure(Some(dir)).expect("Failed to configure");
    assert!(!source.is_embedded());
    configurator
}

fn captured(configurator: &LogConfigurator, appender: &str) -> Vec<String> {
    configurator
        .registry()
        .appender(appender)
        .and_then(|a| a.captured_lines())
        .unwrap_or_default()
}

#[test]
fn test_console_filter_from_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let configurator = installed(temp_dir.path());
    let logger = configurator.registry().logger("app");

    logger.info("not shown");
    logger.warn("disk almost full");

    assert_eq!(captured(&configurator, "Console"), vec!["WARN  disk almost full".to_string()]);
}

#[test]
fn test_full_startup_sequence() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_dir = temp_dir.path().join("logs");
    let configurator = installed(temp_dir.path());
    let registry = configurator.registry();
    let app = registry.logger("app");

    assert!(configurator
        .install_file_appenders(log_dir.to_str().unwrap(), "tool", &["Trace"])
        .unwrap());

    let outcome = configurator.apply_verbosity(
        VerbosityFlags::new(true, true, true),
        &configurator.settings().debug_exclusions(),
    );
    assert!(outcome.debug);
    assert!(outcome.verbose);
    assert!(outcome.trace.main_layout_detailed);

    app.debug("debug detail");
    app.info("progress");
    registry.logger("Trace").trace("trace detail");
    registry.flush_all().unwrap();

    let main = fs::read_to_string(log_dir.join("tool.log")).unwrap();
    let summary = fs::read_to_string(log_dir.join("tool.summary.log")).unwrap();
    assert!(main.contains("debug detail"));
    assert!(main.contains("progress"));
    // Detailed layout adds the call site, unknown for plain method calls
    assert!(main.contains("(?:? in ?)"));
    assert!(!summary.contains("debug detail"));
    assert!(summary.contains("progress"));
    assert!(!main.contains("trace detail"));

    let console = captured(&configurator, "Console");
    assert!(console.iter().any(|l| l.contains("debug detail")));
    assert_eq!(captured(&configurator, "TraceConsole"), vec!["TRACE trace detail".to_string()]);
    assert_eq!(
        registry.appender("MainLog").unwrap().layout(),
        Layout::pattern(DETAILED_PATTERN).unwrap()
    );
}

#[test]
fn test_verbose_without_debug() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let configurator = installed(temp_dir.path());
    let logger = configurator.registry().logger("app");

    assert!(configurator.set_verbose(true, false));
    logger.info("now visible");
    logger.debug("still hidden");

    assert_eq!(captured(&configurator, "Console"), vec!["INFO  now visible".to_string()]);
}

#[test]
fn test_add_log_file_after_install() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let configurator = installed(temp_dir.path());
    let extra = temp_dir.path().join("session").join("run.log");

    assert!(configurator.add_log_file(extra.to_str().unwrap()).unwrap());
    configurator.registry().logger("app").error("copied to session log");
    configurator.registry().logger("Trace").error("trace stays out");
    configurator.registry().flush_all().unwrap();

    let content = fs::read_to_string(&extra).unwrap();
    assert!(content.contains("ERROR app - copied to session log"));
    assert!(!content.contains("trace stays out"));
}

#[test]
fn test_embedded_default_when_no_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let configurator = LogConfigurator::new(Arc::new(LoggerRegistry::new()));
    let source = configurator.configure(Some(temp_dir.path())).unwrap();

    assert!(source.is_embedded());
    let console = configurator.registry().appender("Console").unwrap();
    assert_eq!(console.kind(), "console");
    assert_eq!(console.filter(), Some(LevelRangeFilter::at_least(LogLevel::Warn)));
    assert_eq!(
        configurator.registry().appender("TraceConsole").unwrap().filter(),
        Some(LevelRangeFilter::deny_all())
    );
}

#[test]
fn test_reconfigure_keeps_installation_one_shot() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let configurator = installed(temp_dir.path());
    let dir = temp_dir.path().to_str().unwrap();

    assert!(configurator.install_file_appenders(dir, "first", &[]).unwrap());
    configurator.configure(Some(temp_dir.path())).unwrap();
    assert!(!configurator.registry().has_appender("MainLog"));
    assert!(!configurator.install_file_appenders(dir, "second", &[]).unwrap());
}

#[test]
fn test_log_injection_prevention() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let configurator = LogConfigurator::new(Arc::new(LoggerRegistry::new()));
    let log_file = temp_dir.path().join("injection.log");
    configurator.add_log_file(log_file.to_str().unwrap()).unwrap();

    let malicious_message = "User login\nERROR [2024-10-17] Fake error injected\nINFO Continuation";
    configurator.registry().logger("auth").info(malicious_message);
    configurator.registry().flush_all().unwrap();

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert!(content.contains("\\n"));
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1, "Log should be a single line, not multiple");
}

#[test]
fn test_rolling_keeps_bounded_backups() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let configurator = LogConfigurator::new(Arc::new(LoggerRegistry::new()));
    let settings = FileLogSettings::new(temp_dir.path(), "small").with_policy(
        RollingPolicy::new()
            .with_max_size(256)
            .with_max_backups(3),
    );
    assert!(configurator.install_file_appenders_with(&settings).unwrap());

    let logger = configurator.registry().logger("app");
    for i in 0..200 {
        logger.info(format!("message number {} with some padding text", i));
    }
    configurator.registry().flush_all().unwrap();

    assert!(temp_dir.path().join("small.log.1").exists());
    assert!(temp_dir.path().join("small.log.3").exists());
    assert!(!temp_dir.path().join("small.log.4").exists());
}

#[test]
fn test_global_entry_points() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join("logging.xml"), APP_CONFIG).unwrap();
    let install_dir = temp_dir.path().to_str().unwrap();

    configurator::configure(install_dir).unwrap();
    assert!(configurator::set_verbose(true, true));
    assert!(!configurator::set_debug(false, &[]));
    assert!(configurator::set_trace(true).trace_logger_enabled);
    assert!(!configurator::add_log_file("").unwrap());
    assert!(!configurator::install_file_appenders("", "app", &[]).unwrap());

    let logger = rust_log_configurator::logger("global");
    rust_log_configurator::info!(logger, "through the macro {}", 1);

    let console = LoggerRegistry::global()
        .appender("Console")
        .and_then(|a| a.captured_lines())
        .unwrap();
    assert!(console.iter().any(|l| l.contains("through the macro 1")));
}
