//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// review-labeler: label review text with an LLM and a bounded-length justification
#[derive(Parser, Debug)]
#[command(name = "review-labeler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Label every review in the dataset and write the results
    Run(RunArgs),

    /// Generate the synthetic review dataset
    Fixture(FixtureArgs),

    /// One-shot labeling of a single text
    Label(LabelArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the input dataset path
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Override the output path
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Override the reasoning word limit
    #[arg(long)]
    pub max_words: Option<usize>,

    /// Fail instead of generating a fixture when the dataset is missing
    #[arg(long)]
    pub no_fixture: bool,
}

#[derive(Args, Debug)]
pub struct FixtureArgs {
    /// Where to write the dataset (defaults to the configured data path)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Number of reviews
    #[arg(long)]
    pub size: Option<usize>,

    /// RNG seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Overwrite an existing dataset
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct LabelArgs {
    /// Text to label
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// File containing text to label (use - for stdin)
    #[arg(long, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Override the reasoning word limit
    #[arg(long)]
    pub max_words: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
