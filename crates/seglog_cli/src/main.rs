//! seglog CLI
//!
//! Command-line tools for inspecting and maintaining seglog commit logs.
//!
//! # Commands
//!
//! - `append` - Append records to a log
//! - `read` - Print the record at an offset
//! - `inspect` - Display offsets and segment statistics
//! - `dump` - Stream every stored record
//! - `truncate` - Delete consumed segments
//! - `reset` - Delete every record

mod commands;

use clap::{Parser, Subcommand};
use seglog_core::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// seglog commit log tools.
#[derive(Parser)]
#[command(name = "seglog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the log directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Store size in bytes past which a segment is sealed
    #[arg(global = true, long)]
    max_store_bytes: Option<u64>,

    /// Index size in bytes at which a segment is sealed
    #[arg(global = true, long)]
    max_index_bytes: Option<u64>,

    /// Base offset of a fresh log
    #[arg(global = true, long)]
    initial_offset: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append records to the log
    Append {
        /// Record values, one record each
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Print the record stored at an offset
    Read {
        /// Offset to read
        #[arg(short, long)]
        offset: u64,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Display offsets and segment statistics
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Dump stored records in offset order
    Dump {
        /// Maximum number of records to dump
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Delete segments whose records are all at or below an offset
    Truncate {
        /// Highest consumed offset
        #[arg(short, long)]
        lowest: u64,
    },

    /// Delete every record and start over at the initial offset
    Reset,

    /// Show version information
    Version,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::new();
        if let Some(bytes) = self.max_store_bytes {
            config = config.max_store_bytes(bytes);
        }
        if let Some(bytes) = self.max_index_bytes {
            config = config.max_index_bytes(bytes);
        }
        if let Some(offset) = self.initial_offset {
            config = config.initial_offset(offset);
        }
        config
    }
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

    let config = cli.config();

    match cli.command {
        Commands::Append { values } => {
            let path = cli.path.ok_or("Log path required for append")?;
            commands::append::run(&path, config, &values)?;
        }
        Commands::Read { offset, format } => {
            let path = cli.path.ok_or("Log path required for read")?;
            commands::read::run(&path, config, offset, &format)?;
        }
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Log path required for inspect")?;
            commands::inspect::run(&path, config, &format)?;
        }
        Commands::Dump { limit, format } => {
            let path = cli.path.ok_or("Log path required for dump")?;
            commands::dump::run(&path, config, limit, &format)?;
        }
        Commands::Truncate { lowest } => {
            let path = cli.path.ok_or("Log path required for truncate")?;
            commands::truncate::run(&path, config, lowest)?;
        }
        Commands::Reset => {
            let path = cli.path.ok_or("Log path required for reset")?;
            commands::reset::run(&path, config)?;
        }
        Commands::Version => {
            println!("seglog CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("seglog core v{}", seglog_core::VERSION);
        }
    }

    Ok(())
}
