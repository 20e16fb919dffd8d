//! objcat CLI
//!
//! Command-line tools for measuring catalog behaviour on generated data.
//!
//! # Commands
//!
//! - `lookup` - Compare catalog lookups against linear scans
//! - `construct` - Compare strong and weak catalog construction
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// objcat command-line tools.
#[derive(Parser)]
#[command(name = "objcat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare catalog lookups against linear scans
    Lookup {
        /// Number of generated parent items
        #[arg(short, long, default_value = "100000")]
        quantity: usize,

        /// Custody of the direct catalog (strong, weak)
        #[arg(short, long, default_value = "weak")]
        custody: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Compare strong and weak catalog construction
    Construct {
        /// Number of generated parent items
        #[arg(short, long, default_value = "100000")]
        quantity: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Lookup {
            quantity,
            custody,
            format,
        } => {
            let custody = commands::parse_custody(&custody)?;
            commands::lookup::run(quantity, custody, &format)?;
        }
        Commands::Construct { quantity, format } => {
            commands::construct::run(quantity, &format)?;
        }
        Commands::Version => {
            println!("objcat CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("objcat Core v{}", objcat_core::VERSION);
        }
    }

    Ok(())
}
