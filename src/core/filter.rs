//! Level range filter attached to an appender

use super::log_level::LogLevel;

/// Inclusive severity bounds gating which events reach an appender.
///
/// Either bound may be absent. A minimum of [`LogLevel::Off`] rejects
/// everything, which is how a configured-but-silent appender is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelRangeFilter {
    pub min: Option<LogLevel>,
    pub max: Option<LogLevel>,
}

impl LevelRangeFilter {
    #[must_use]
    pub fn new(min: Option<LogLevel>, max: Option<LogLevel>) -> Self {
        Self { min, max }
    }

    /// Accept `level` and everything above it
    #[must_use]
    pub fn at_least(level: LogLevel) -> Self {
        Self::new(Some(level), None)
    }

    #[must_use]
    pub fn deny_all() -> Self {
        Self::at_least(LogLevel::Off)
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_min(mut self, min: LogLevel) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max(mut self, max: LogLevel) -> Self {
        self.max = Some(max);
        self
    }

    pub fn accepts(&self, level: LogLevel) -> bool {
        if !level.is_emittable() {
            return false;
        }
        if let Some(min) = self.min {
            if level < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if level > max {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_accepts_everything_emittable() {
        let filter = LevelRangeFilter::default();
        assert!(filter.accepts(LogLevel::Trace));
        assert!(filter.accepts(LogLevel::Fatal));
        assert!(!filter.accepts(LogLevel::Off));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let filter = LevelRangeFilter::at_least(LogLevel::Info).with_max(LogLevel::Warn);
        assert!(!filter.accepts(LogLevel::Debug));
        assert!(filter.accepts(LogLevel::Info));
        assert!(filter.accepts(LogLevel::Warn));
        assert!(!filter.accepts(LogLevel::Error));
    }

    #[test]
    fn test_deny_all() {
        let filter = LevelRangeFilter::deny_all();
        assert!(!filter.accepts(LogLevel::Fatal));
    }
}
