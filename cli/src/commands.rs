//! The single `extract` command: load a profile and a dump, run the core
//! pipeline, and write the equations (and optional truth-table) file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use palx_core::emitter::{EmitOptions, Polarity};
use palx_core::{MemoryImage, ProfileSet, QuineMcCluskey};

use crate::{create_progress_bar, Cli};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("could not determine a file name for `{0}`")]
    NoFileStem(PathBuf),
}

pub fn extract(cli: &Cli) -> Result<()> {
    let bytes = std::fs::read(&cli.filename)
        .with_context(|| format!("reading memory dump `{}`", cli.filename.display()))?;

    let profiles_path = resolve_profiles_path(cli)?;
    let profile_set = ProfileSet::load(&profiles_path)
        .with_context(|| format!("loading device profiles from `{}`", profiles_path.display()))?;
    let profile = profile_set.resolve(&cli.device_type, bytes.len())?;

    if !cli.quiet {
        println!(
            "{} {} ({} bytes, profile `{}`)",
            "Loaded dump".green(),
            cli.filename.display(),
            bytes.len(),
            profile.name
        );
    }

    let image = MemoryImage::decode(profile, &bytes)?;

    let polarity: Polarity = cli
        .polarity
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let oe_polarity: Polarity = cli
        .oe_polarity
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let input_stem = cli
        .filename
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| CliError::NoFileStem(cli.filename.clone()))?
        .to_string();

    let opts = EmitOptions {
        polarity,
        oe_polarity,
        input_stem: input_stem.clone(),
        date: chrono::Local::now().format("%Y-%m-%d").to_string(),
        truthtable: cli.truthtable,
    };

    let total_addresses = image.len() as u64;
    let progress = (!cli.quiet).then(|| create_progress_bar(total_addresses));

    let minimizer = QuineMcCluskey;
    let document = palx_core::engine::run(profile, &image, &minimizer, &opts, |addr, _total| {
        if let Some(pb) = &progress {
            pb.set_position(addr as u64 + 1);
        }
    })?;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let equations_path = cli
        .output
        .clone()
        .unwrap_or_else(|| sibling_with_extension(&cli.filename, "pld"));
    std::fs::write(&equations_path, &document.equations)
        .with_context(|| format!("writing equations file `{}`", equations_path.display()))?;

    if let Some(truth_table) = &document.truth_table {
        let tt_path = sibling_with_extension(&cli.filename, "tt");
        std::fs::write(&tt_path, truth_table)
            .with_context(|| format!("writing truth table file `{}`", tt_path.display()))?;
        if !cli.quiet {
            println!("{} {}", "Wrote truth table".green(), tt_path.display());
        }
    }

    if !cli.quiet {
        println!("{} {}", "Wrote equations".green().bold(), equations_path.display());
    }

    if cli.verbose {
        print_diagnostics(profile, &image);
    }

    Ok(())
}

fn resolve_profiles_path(cli: &Cli) -> Result<PathBuf> {
    if cli.profiles.as_path() != Path::new("profiles.config") || cli.profiles.exists() {
        return Ok(cli.profiles.clone());
    }

    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("profiles.config")));

    match beside_exe {
        Some(path) if path.exists() => Ok(path),
        _ => Ok(cli.profiles.clone()),
    }
}

fn sibling_with_extension(input: &Path, extension: &str) -> PathBuf {
    input.with_extension(extension)
}

fn print_diagnostics(profile: &palx_core::DeviceProfile, image: &MemoryImage) {
    use palx_core::pin::{build_pin_model, PinModel};

    let Ok(PinModel { inputs, mut outputs }) = build_pin_model(profile) else {
        return;
    };
    palx_core::dependency::analyze_dependencies(image, &inputs, &mut outputs, |_, _| {});

    println!("\n{}", "Per-pin dependencies:".yellow().bold());
    for op in &outputs {
        let depends: Vec<&str> = op.depends.pinnames().iter().map(String::as_str).collect();
        let oe_depends: Vec<&str> = op.oe_depends.pinnames().iter().map(String::as_str).collect();
        println!(
            "  {} depends=[{}] oe_depends=[{}] seen_high={} seen_low={}",
            op.name.cyan(),
            depends.join(", "),
            oe_depends.join(", "),
            op.seen_high,
            op.seen_low
        );
    }
}
