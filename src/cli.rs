use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "splitforge")]
#[command(author, version, about = "Audio chunking service: re-encode and split audio with ffmpeg")]
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
    /// Start the HTTP service
    Start {
        /// Host to bind to (overrides config and HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Split a local audio file into chunks without touching storage
    Split {
        /// Audio file to split
        #[arg(required = true)]
        input: PathBuf,

        /// Directory to write chunks into
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Chunk duration in seconds (defaults to the configured value)
        #[arg(long)]
        chunk_seconds: Option<u64>,
    },

    /// Check that ffmpeg is available
    CheckTools,

    /// Validate configuration (file plus environment)
    Validate,

    /// Display version information
    Version,
}
