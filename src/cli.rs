//! Command-line interface for the murmur demo binary
//!
//! Handles argument parsing and logging configuration.

use clap::Parser;
use log::LevelFilter;

/// Murmur - voice note capture and playback demo
#[derive(Parser, Debug)]
#[command(name = "murmur")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Increase logging verbosity
    /// -v = info, -vv = debug, -vvv = trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,

    /// How long to record, in seconds
    #[arg(short, long, default_value_t = 3)]
    pub seconds: u64,

    /// Number of waveform buckets to render
    #[arg(short, long, default_value_t = crate::waveform::DEFAULT_BUCKETS)]
    pub buckets: usize,

    /// Simulate a denied recording permission
    #[arg(long)]
    pub deny_permission: bool,

    /// Dump the finished note library as JSON
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Get the log level filter based on verbosity flags
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else {
            match self.verbose {
                0 => LevelFilter::Warn,
                1 => LevelFilter::Info,
                2 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        }
    }
}

/// Initialize the logging system based on CLI arguments
pub fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::new();

    // Base level for all modules - keep at warn to suppress noisy deps
    builder.filter_level(LevelFilter::Warn);

    // Set murmur modules to the requested verbosity level
    builder.filter_module("murmur", args.log_level());

    builder.format_timestamp_millis().init();
}
