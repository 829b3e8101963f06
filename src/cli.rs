//! Command-line arguments

use clap::{Parser, ValueHint};

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Batch face attribute classification with dominant-attribute statistics"
)]
pub struct Cli {
    /// Configuration file
    #[arg(long, default_value = Config::default_path(), value_hint = ValueHint::FilePath)]
    pub config: String,

    /// Rename `face_{i}.jpg` files in the batch folder to `{i:06}.png` and exit
    #[arg(long)]
    pub prepare: bool,
}
