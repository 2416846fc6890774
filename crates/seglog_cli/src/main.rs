//! SegLog CLI
//!
//! Command-line tools for SegLog store files.
//!
//! # Commands
//!
//! - `append` - Append records to a store file
//! - `read` - Print the record at a position
//! - `dump` - List records for debugging
//! - `inspect` - Display store statistics
//! - `verify` - Verify record framing

mod commands;

use clap::{Parser, Subcommand};
use commands::Format;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// SegLog command-line store tools.
#[derive(Parser)]
#[command(name = "seglog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append records (arguments, or stdin lines when none are given)
    Append {
        /// Payloads to append, one record each
        payloads: Vec<String>,
    },

    /// Print the record at a position
    Read {
        /// Position of the record's length prefix
        #[arg(long)]
        position: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// List records for debugging
    Dump {
        /// Maximum number of records to dump
        #[arg(short, long)]
        limit: Option<usize>,

        /// Start from this position
        #[arg(short, long, default_value = "0")]
        offset: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Display store statistics
    Inspect {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Verify record framing
    Verify,

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
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Append { payloads } => {
            let path = cli.path.ok_or("Store path required for append")?;
            commands::append::run(&path, &payloads)?;
        }
        Commands::Read { position, format } => {
            let path = cli.path.ok_or("Store path required for read")?;
            commands::read::run(&path, position, format)?;
        }
        Commands::Dump {
            limit,
            offset,
            format,
        } => {
            let path = cli.path.ok_or("Store path required for dump")?;
            commands::dump::run(&path, limit, offset, format)?;
        }
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Store path required for inspect")?;
            commands::inspect::run(&path, format)?;
        }
        Commands::Verify => {
            let path = cli.path.ok_or("Store path required for verify")?;
            commands::verify::run(&path)?;
        }
        Commands::Version => {
            println!("SegLog CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
