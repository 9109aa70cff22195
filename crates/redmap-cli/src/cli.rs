//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Redmap: REDCap data dictionary import and mapping templates
#[derive(Parser)]
#[command(name = "redmap")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a data dictionary and show what was found
    Inspect {
        /// Path to the REDCap data dictionary (CSV)
        #[arg(value_name = "DICTIONARY")]
        file: PathBuf,

        /// Output the normalized fields as JSON
        #[arg(long)]
        json: bool,

        /// Field delimiter (auto-detected if omitted)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Create an empty mapping template from a data dictionary
    Init {
        /// Path to the REDCap data dictionary (CSV)
        #[arg(value_name = "DICTIONARY")]
        file: PathBuf,

        /// Template name
        #[arg(short, long)]
        name: String,

        /// Output path (default: <dictionary>.template.yaml)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check whether a template still matches a data dictionary
    Check {
        /// Path to the template (YAML)
        #[arg(value_name = "TEMPLATE")]
        template: PathBuf,

        /// Path to the REDCap data dictionary (CSV)
        #[arg(short, long)]
        dictionary: PathBuf,
    },

    /// Show mapping progress of a template
    Status {
        /// Path to the template (YAML)
        #[arg(value_name = "TEMPLATE")]
        template: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
