use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folioforge")]
#[command(author, version, about = "Sanitize the images inside EPUB files")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sanitize an EPUB and write a repacked copy
    Sanitize {
        /// EPUB to sanitize
        #[arg(required = true)]
        input: PathBuf,

        /// Output path (default: <stem>_sanitized.epub next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print per-file reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sanitize an unpacked book directory in place
    Scan {
        /// Directory to scan
        #[arg(required = true)]
        dir: PathBuf,

        /// Print per-file reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract an EPUB, skipping entries that escape the destination
    Unpack {
        input: PathBuf,
        dest: PathBuf,
    },

    /// Pack a directory into an EPUB with mimetype first
    Pack {
        src: PathBuf,
        output: PathBuf,
    },

    /// Show the real format of image files
    Sniff {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
