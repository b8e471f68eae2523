//! Property-based tests for rust_log_configurator using proptest

use proptest::prelude::*;
use rust_log_configurator::appenders::parse_size;
use rust_log_configurator::prelude::*;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Trace),
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Fatal),
        Just(LogLevel::Off),
    ]
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Level names parse back regardless of case
    #[test]
    fn test_log_level_str_roundtrip(level in any_level(), upper in any::<bool>()) {
        let name = if upper {
            level.to_str().to_uppercase()
        } else {
            level.to_str().to_lowercase()
        };
        let parsed: LogLevel = name.parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Ordering follows the numeric representation
    #[test]
    fn test_log_level_ordering(level1 in any_level(), level2 in any_level()) {
        prop_assert_eq!(level1 <= level2, (level1 as u8) <= (level2 as u8));
        prop_assert_eq!(level1 < level2, (level1 as u8) < (level2 as u8));
    }

    /// Arbitrary text never panics the parser
    #[test]
    fn test_log_level_parse_total(text in "\\PC{0,12}") {
        let _ = text.parse::<LogLevel>();
    }
}

// ============================================================================
// LevelRangeFilter Tests
// ============================================================================

proptest! {
    /// A filter accepts exactly the emittable levels inside its bounds
    #[test]
    fn test_filter_matches_bounds(
        min in proptest::option::of(any_level()),
        max in proptest::option::of(any_level()),
        level in any_level(),
    ) {
        let filter = LevelRangeFilter::new(min, max);
        let expected = level != LogLevel::Off
            && min.map_or(true, |m| level >= m)
            && max.map_or(true, |m| level <= m);
        prop_assert_eq!(filter.accepts(level), expected);
    }

    /// Lowering the minimum never rejects anything previously accepted
    #[test]
    fn test_lower_minimum_is_superset(min in any_level(), lower in any_level(), level in any_level()) {
        prop_assume!(lower <= min);
        let strict = LevelRangeFilter::at_least(min);
        let relaxed = strict.with_min(lower);
        if strict.accepts(level) {
            prop_assert!(relaxed.accepts(level));
        }
    }
}

// ============================================================================
// Size Parsing Tests
// ============================================================================

proptest! {
    #[test]
    fn test_parse_size_units(value in 1u64..4096, unit in prop_oneof![
        Just(("", 1u64)),
        Just(("KB", 1024)),
        Just(("kb", 1024)),
        Just(("MB", 1024 * 1024)),
        Just(("GB", 1024 * 1024 * 1024)),
    ]) {
        let text = format!("{}{}", value, unit.0);
        prop_assert_eq!(parse_size(&text).unwrap(), value * unit.1);
    }

    #[test]
    fn test_parse_size_rejects_garbage(text in "[a-zA-Z]{1,8}") {
        prop_assert!(parse_size(&text).is_err());
    }
}

// ============================================================================
// Pattern Layout Tests
// ============================================================================

proptest! {
    /// `%-Nlevel` pads to at least N characters and keeps the name first
    #[test]
    fn test_level_padding(width in 0usize..12, level in any_level()) {
        let layout = Layout::pattern(&format!("%-{}level|", width)).unwrap();
        let rendered = layout.render(&LogEntry::new(level, "p", "m"));
        let field = rendered.trim_end_matches('|');
        prop_assert!(field.len() >= width);
        prop_assert!(field.starts_with(level.to_str()));
    }

    /// Messages never introduce line breaks into a rendered line
    #[test]
    fn test_message_is_single_line(message in "\\PC{0,40}(\n\\PC{0,40}){0,3}") {
        let layout = Layout::pattern("%message%newline").unwrap();
        let rendered = layout.render(&LogEntry::new(LogLevel::Info, "p", message));
        prop_assert_eq!(rendered.matches('\n').count(), 1);
        prop_assert!(rendered.ends_with('\n'));
    }
}
