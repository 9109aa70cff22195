//! Redmap CLI - REDCap data dictionary import and mapping templates.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("redmap={level},redmap_cli={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Inspect {
            file,
            json,
            delimiter,
        } => commands::inspect::run(file, json, delimiter),

        Commands::Init { file, name, output } => commands::init::run(file, name, output),

        Commands::Check {
            template,
            dictionary,
        } => commands::check::run(template, dictionary),

        Commands::Status { template, json } => commands::status::run(template, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
