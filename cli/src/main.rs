//! palx - PAL logic extraction from EPROM-socket memory dumps
//!
//! ```bash
//! palx dump.bin --device-type auto --polarity auto --truthtable
//! ```

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

mod commands;

/// Reverse-engineer a PAL device's Boolean equations from a full EPROM-socket memory dump.
#[derive(Parser)]
#[command(name = "palx")]
#[command(version)]
#[command(about = "Extract PAL logic equations from an EPROM-socket memory dump")]
#[command(long_about = None)]
pub struct Cli {
    /// Binary memory dump captured through the EPROM socket adapter
    pub filename: PathBuf,

    /// Device profile name, or `auto` to match by dump size
    #[arg(short = 'd', long = "device-type", default_value = "auto")]
    pub device_type: String,

    /// Output equation polarity
    #[arg(short = 'p', long, default_value = "auto")]
    pub polarity: String,

    /// Output-enable equation polarity
    #[arg(short = 'e', long = "oe-polarity", default_value = "auto")]
    pub oe_polarity: String,

    /// Path to the device profile config file
    #[arg(short = 'c', long, default_value = "profiles.config")]
    pub profiles: PathBuf,

    /// Also emit a raw truth-table file alongside the equations file
    #[arg(short = 't', long)]
    pub truthtable: bool,

    /// Override the equations file output path
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Print per-pin dependency diagnostics
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress the banner and progress bar
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        print_banner();
    }

    if let Err(e) = commands::extract(&cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn print_banner() {
    println!(
        "{}",
        r#"
  ____  ___    _ __  __
 |  _ \/ _ \  | |\ \/ /
 | |_) | |_| | | | \  /
 |  __/\__,_|_| | /  \
 |_|           |_|/_/\_\
       PAL logic extraction
"#
        .cyan()
    );
}

/// Create a progress bar in the style shared across the pipeline's outer loops.
pub fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    let pb = indicatif::ProgressBar::new(total);
    pb.set_style(
        indicatif::ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} addresses")
            .unwrap()
            .progress_chars("█▓▒░"),
    );
    pb
}
