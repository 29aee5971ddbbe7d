// CLI module
// Command-line interface, argument parsing and logging setup

mod args;

pub use args::{CliArgs, Config, RunMode};

use clap::Parser;

/// Parse command-line arguments using clap
///
/// If parsing fails (invalid arguments, missing `--input`, or `--help`), clap
/// prints an error or help text and exits the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

/// Initialize logging
///
/// Logs at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
