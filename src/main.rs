//! Binary entry point: parse arguments, initialize logging, run the
//! daemon, and translate failures into the CLI's exit-code contract.

use std::process;

use clap::Parser;
use colored::Colorize;

use typetrace_backend::config::{Cli, Config};
use typetrace_backend::controller;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    print!("{e}");
                    process::exit(0);
                }
                _ => {
                    eprint!("{e}");
                    process::exit(1);
                }
            }
        }
    };

    let config = Config::from(cli);
    controller::init_logger(&config);

    if let Err(err) = controller::run(config) {
        if err.is_permission_error() {
            eprintln!("{}", err.to_string().red().bold());
        } else {
            eprintln!("{}", format!("typetrace_backend: {err}").red());
        }
        process::exit(err.exit_code());
    }
}
