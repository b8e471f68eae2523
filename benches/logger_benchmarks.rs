//! Criterion benchmarks for rust_log_configurator

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_log_configurator::config::{embedded_resource, parse_config};
use rust_log_configurator::core::layout::DETAILED_PATTERN;
use rust_log_configurator::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// Discards output so only rendering and dispatch are measured
struct NullAppender;

impl Appender for NullAppender {
    fn append(&mut self, _entry: &LogEntry, rendered: &str) -> Result<()> {
        black_box(rendered);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn kind(&self) -> &str {
        "null"
    }
}

fn registry_with(layout: Layout) -> (LoggerRegistry, Arc<Logger>) {
    let registry = LoggerRegistry::new();
    let handle = registry
        .register_appender(AppenderHandle::new("sink", NullAppender).with_layout(layout).shared())
        .expect("Failed to register appender");
    registry.root().add_appender(handle);
    registry.root().set_level(Some(LogLevel::Trace));
    let logger = registry.logger("bench");
    (registry, logger)
}

// ============================================================================
// Dispatch Benchmarks
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    let (_default_registry, default_logger) = registry_with(Layout::default());
    group.bench_function("default_pattern", |b| {
        b.iter(|| default_logger.info(black_box("Info message")));
    });

    let (_detailed_registry, detailed_logger) =
        registry_with(Layout::pattern(DETAILED_PATTERN).expect("Invalid pattern"));
    group.bench_function("detailed_pattern", |b| {
        b.iter(|| {
            detailed_logger.log_at(
                LogLevel::Info,
                black_box("Info message"),
                file!(),
                line!(),
                module_path!(),
            )
        });
    });

    let (_json_registry, json_logger) = registry_with(Layout::Json);
    group.bench_function("json", |b| {
        b.iter(|| json_logger.info(black_box("Info message")));
    });

    group.finish();
}

// ============================================================================
// Filtering Benchmarks
// ============================================================================

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let (registry, logger) = registry_with(Layout::default());
    registry.set_threshold(LogLevel::Warn);

    group.bench_function("below_threshold", |b| {
        b.iter(|| logger.debug(black_box("Filtered message")));
    });

    let appender = registry.appender("sink").expect("Appender missing");
    registry.set_threshold(LogLevel::Trace);
    appender.set_filter(Some(LevelRangeFilter::at_least(LogLevel::Error)));
    group.bench_function("rejected_by_appender_filter", |b| {
        b.iter(|| logger.info(black_box("Filtered message")));
    });

    group.finish();
}

// ============================================================================
// Configuration Benchmarks
// ============================================================================

fn bench_configuration(c: &mut Criterion) {
    let mut group = c.benchmark_group("configuration");

    let xml = embedded_resource(&Platform::Linux.resource_name())
        .expect("Embedded configuration missing");

    group.bench_function("parse_embedded", |b| {
        b.iter(|| parse_config(black_box(xml), "bench.xml"))
    });

    group.bench_function("configure_embedded", |b| {
        let configurator = LogConfigurator::new(Arc::new(LoggerRegistry::new()));
        b.iter(|| configurator.configure_from_str(black_box(xml), Path::new(".")))
    });

    group.bench_function("set_debug", |b| {
        let configurator = LogConfigurator::new(Arc::new(LoggerRegistry::new()));
        configurator
            .configure_from_str(xml, Path::new("."))
            .expect("Failed to configure");
        b.iter(|| configurator.set_debug(black_box(true), &["TraceConsole"]))
    });

    group.finish();
}

criterion_group!(benches, bench_dispatch, bench_level_filtering, bench_configuration);
criterion_main!(benches);
