//! Runtime verbosity toggles
//!
//! Each toggle only ever relaxes what the configuration set up: levels and
//! filter minimums move down towards more output, never up. A disabled
//! toggle is a no-op, so callers can pass command-line flags straight in.

use super::{trace_bridge, LogConfigurator};
use crate::core::filter::LevelRangeFilter;
use crate::core::layout::{Layout, PatternLayout, DETAILED_PATTERN};
use crate::core::log_level::LogLevel;

/// Command-line style switches for [`LogConfigurator::apply_verbosity`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerbosityFlags {
    pub debug: bool,
    pub verbose: bool,
    pub trace: bool,
}

impl VerbosityFlags {
    pub fn new(debug: bool, verbose: bool, trace: bool) -> Self {
        Self { debug, verbose, trace }
    }
}

/// What [`LogConfigurator::set_trace`] changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceActivation {
    pub trace_appender_relaxed: bool,
    pub trace_logger_enabled: bool,
    /// `log` facade bridge installed by this call
    pub listener_attached: bool,
    pub main_layout_detailed: bool,
}

/// Result of [`LogConfigurator::apply_verbosity`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerbosityOutcome {
    pub debug: bool,
    pub verbose: bool,
    pub trace: TraceActivation,
}

/// Lower `min` to `target` unless it is already at or below it
fn relax(filter: LevelRangeFilter, target: LogLevel) -> LevelRangeFilter {
    match filter.min {
        Some(min) if min > target => filter.with_min(target),
        _ => filter,
    }
}

impl LogConfigurator {
    /// Open the registry up to debug output.
    ///
    /// Threshold and every logger level (root included) drop to
    /// [`LogLevel::Debug`] unless already lower; filters are removed from
    /// every appender not named in `excluded_appenders`. Returns whether
    /// anything was applied.
    pub fn set_debug(&self, enabled: bool, excluded_appenders: &[&str]) -> bool {
        if !enabled {
            return false;
        }
        let registry = &self.registry;

        if registry.threshold() > LogLevel::Debug {
            registry.set_threshold(LogLevel::Debug);
        }
        for logger in registry.all_loggers() {
            match logger.level() {
                Some(level) if level <= LogLevel::Debug => {}
                _ => logger.set_level(Some(LogLevel::Debug)),
            }
        }
        for appender in registry.appenders() {
            if !excluded_appenders.contains(&appender.name()) {
                appender.set_filter(None);
            }
        }
        true
    }

    /// Relax the console appender's filter to info, or to debug when `debug`
    /// is set. Returns `false` if disabled or the appender does not exist.
    pub fn set_verbose(&self, enabled: bool, debug: bool) -> bool {
        if !enabled {
            return false;
        }
        let Some(console) = self.registry.appender(&self.settings.console_appender) else {
            return false;
        };
        let target = if debug { LogLevel::Debug } else { LogLevel::Info };
        if let Some(filter) = console.filter() {
            console.set_filter(Some(relax(filter, target)));
        }
        true
    }

    /// Turn on trace output.
    ///
    /// The trace appender's filter opens to [`LogLevel::Trace`], the trace
    /// logger is set to trace, the `log` facade is bridged into the trace
    /// logger (once per registry) and the main appender switches to the
    /// detailed layout with file, method and line.
    pub fn set_trace(&self, enabled: bool) -> TraceActivation {
        let mut activation = TraceActivation::default();
        if !enabled {
            return activation;
        }
        let registry = &self.registry;
        let settings = &self.settings;

        if let Some(appender) = registry.appender(&settings.trace_appender) {
            if let Some(filter) = appender.filter() {
                appender.set_filter(Some(relax(filter, LogLevel::Trace)));
            }
            activation.trace_appender_relaxed = true;
        }

        let trace_logger = registry.logger(&settings.trace_logger);
        trace_logger.set_level(Some(LogLevel::Trace));
        activation.trace_logger_enabled = true;

        if registry.claim_trace_listener() {
            match trace_bridge::install(trace_logger) {
                Ok(()) => activation.listener_attached = true,
                Err(e) => eprintln!("[LOGGER WARNING] Trace listener not attached: {}", e),
            }
        }

        if let Some(main) = registry.appender(&settings.main_appender) {
            match PatternLayout::parse(DETAILED_PATTERN) {
                Ok(layout) => {
                    main.set_layout(Layout::Pattern(layout));
                    activation.main_layout_detailed = true;
                }
                Err(e) => eprintln!("[LOGGER ERROR] Detailed layout unavailable: {}", e),
            }
        }

        activation
    }

    /// Debug, then verbose, then trace
    pub fn apply_verbosity(&self, flags: VerbosityFlags, excluded_appenders: &[&str]) -> VerbosityOutcome {
        VerbosityOutcome {
            debug: self.set_debug(flags.debug, excluded_appenders),
            verbose: self.set_verbose(flags.verbose, flags.debug),
            trace: self.set_trace(flags.trace),
        }
    }
}
