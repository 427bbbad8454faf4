//! Command-line surface and the explicit configuration record it builds.

use clap::Parser;

/// TypeTrace backend: captures per-day keystroke frequency counts.
#[derive(Debug, Parser)]
#[command(name = "typetrace_backend", version, about, disable_help_subcommand = true)]
pub struct Cli {
    /// Enable debug-level logging.
    #[arg(short, long)]
    pub debug: bool,
}

/// The single configuration record threaded through construction of every
/// leaf component. No process-wide `static` carries any of this state.
#[derive(Debug, Clone)]
pub struct Config {
    pub debug: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self { debug: cli.debug }
    }
}
