use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a subtitle file and print its cues
    Parse {
        /// Input subtitle file
        #[arg(short, long)]
        input: PathBuf,

        /// Print cues as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how a subtitle file would be split for translation
    Segment {
        /// Input subtitle file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Translate a subtitle file
    Translate {
        /// Input subtitle file
        #[arg(short, long)]
        input: PathBuf,

        /// Output subtitle file
        #[arg(short, long)]
        output: PathBuf,

        /// Target language code (overrides config)
        #[arg(short, long)]
        target_lang: Option<String>,
    },

    /// Translate every subtitle file in a directory
    Batch {
        /// Input directory containing subtitle files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Output directory for translated files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Target language code (overrides config)
        #[arg(short, long)]
        target_lang: Option<String>,
    },

    /// Play a subtitle file in the terminal against a simulated clock
    Play {
        /// Input subtitle file
        #[arg(short, long)]
        input: PathBuf,

        /// Translate in the background and switch to the translated track when ready
        #[arg(long)]
        translate: bool,

        /// Playback rate (overrides config)
        #[arg(short, long)]
        rate: Option<f64>,
    },

    /// Check that the configured translation provider is reachable
    Check,

    /// Write the default configuration to a file
    InitConfig {
        /// Destination path
        path: PathBuf,
    },
}
