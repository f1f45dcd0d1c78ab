#![forbid(unsafe_code)]

//! reachboard CLI entry point.

use clap::Parser;

mod cli_app;

fn main() {
    let args = cli_app::Cli::parse();
    if let Err(e) = cli_app::run(&args) {
        eprintln!("reachboard: {e}");
        std::process::exit(e.exit_code());
    }
}
