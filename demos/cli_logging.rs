//! Command-line program wiring verbosity flags to the configurator
//!
//! ```text
//! cargo run --example cli_logging -- --log-dir /tmp/demo-logs --verbose --trace
//! ```

use clap::Parser;
use rust_log_configurator::configurator::{self, VerbosityFlags};
use rust_log_configurator::{debug, info, trace, warn, ConfiguratorSettings};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cli_logging", about = "Demonstrates logging setup for a command-line tool")]
struct Cli {
    /// Directory searched for logging.xml
    #[arg(long, default_value = "")]
    install_dir: String,

    /// Directory for the rolling main and summary logs
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Base name of the rolling log files
    #[arg(long, default_value = "cli_logging")]
    base_name: String,

    /// Log everything down to debug everywhere
    #[arg(long)]
    debug: bool,

    /// Show informational output on the console
    #[arg(short, long)]
    verbose: bool,

    /// Enable trace output and detailed file layout
    #[arg(long)]
    trace: bool,

    /// Copy all output to this file as well
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> rust_log_configurator::Result<()> {
    let cli = Cli::parse();

    let source = configurator::configure(&cli.install_dir)?;

    if let Some(dir) = &cli.log_dir {
        configurator::install_file_appenders(&dir.to_string_lossy(), &cli.base_name, &["Trace"])?;
    }

    let settings = ConfiguratorSettings::default();
    let outcome = configurator::apply_verbosity(
        VerbosityFlags::new(cli.debug, cli.verbose, cli.trace),
        &settings.debug_exclusions(),
    );

    if let Some(path) = &cli.log_file {
        configurator::add_log_file(&path.to_string_lossy())?;
    }

    let logger = rust_log_configurator::logger("cli_logging");
    info!(logger, "configured from {}", source);
    debug!(logger, "verbosity outcome: {:?}", outcome);
    warn!(logger, "this line always reaches the console");

    let trace_logger = rust_log_configurator::logger(&settings.trace_logger);
    trace!(trace_logger, "trace listener attached: {}", outcome.trace.listener_attached);

    // Records from libraries using the `log` facade end up in the trace logger
    log::trace!(target: "cli_logging::facade", "bridged record");

    rust_log_configurator::LoggerRegistry::global().flush_all()
}
