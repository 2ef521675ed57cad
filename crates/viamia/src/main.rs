mod cli;

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use viamia_core::Config;

use crate::cli::Outcome;

#[derive(Parser, Debug)]
#[command(name = "viamia")]
#[command(about = "Use your own keyboard definitions with the VIA desktop app")]
#[command(version)]
struct Cli {
    /// Base URL VIA should load keyboard definitions from
    /// [default: https://viamia.github.io]
    url: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = Cli::parse();
    init_tracing();

    let config = Config::new(args.url);
    let code = match cli::run(&config) {
        Ok(Outcome::Patched(summary)) => {
            println!("{}", cli::format_summary(&summary));
            cli::EXIT_SUCCESS
        }
        Ok(Outcome::Declined) => {
            println!("Aborted.");
            cli::EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            cli::exit_code(&e)
        }
    };
    process::exit(code);
}
