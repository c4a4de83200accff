use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(name = "numscope")]
#[command(about = "Classify integers in a range against configurable categories")]
#[command(version)]
pub struct Cli {
    /// Start of the range to analyze (inclusive)
    #[arg(required_unless_present = "completions")]
    pub min: Option<i64>,

    /// End of the range to analyze (inclusive, must be greater than min)
    #[arg(required_unless_present = "completions")]
    pub max: Option<i64>,

    /// Category configuration file
    #[arg(short, long, default_value = "analyzer-config.json")]
    pub config: PathBuf,

    /// Save results to this RTF file instead of printing to the console
    #[arg(short, long)]
    pub output: Option<String>,

    /// Directory for generated export files
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Answer yes to the large-range file prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Suppress warnings and status messages (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
