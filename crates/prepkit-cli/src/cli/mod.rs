//! CLI for the prepkit bootstrap toolkit.

mod commands;
mod confirm;
mod progress_bar;

use anyhow::Result;
use clap::{Parser, Subcommand};
use prepkit_core::config;
use std::path::PathBuf;

use commands::{run_extract, run_fetch};

/// Top-level CLI for prepkit.
#[derive(Debug, Parser)]
#[command(name = "prepkit")]
#[command(about = "prepkit: fetch build prerequisites and unpack archives", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a file, trying each URL in order until one succeeds.
    Fetch {
        /// Source URLs, in preference order (first is the primary, the rest
        /// are mirrors).
        #[arg(required = true)]
        urls: Vec<String>,

        /// Destination path. Defaults to a filename derived from the first
        /// URL, in the current directory.
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,

        /// Extra request header, as "Name: value". May be repeated.
        #[arg(long = "header", value_name = "NAME: VALUE")]
        headers: Vec<String>,

        /// Skip the confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Unpack a zip archive into the directory it sits in, skipping files
    /// that already exist.
    Extract {
        /// Path to the zip archive.
        path: PathBuf,

        /// Remove the archive after successful extraction.
        #[arg(long)]
        delete_archive: bool,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;

        match cli.command {
            CliCommand::Fetch {
                urls,
                out,
                headers,
                yes,
            } => run_fetch(&cfg, urls, out, &headers, yes),
            CliCommand::Extract {
                path,
                delete_archive,
            } => run_extract(&path, delete_archive),
        }
    }
}
