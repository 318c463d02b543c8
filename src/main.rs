//! nav2 CLI - Command-line tool for inspecting `.nav2` navigation data.
//!
//! This is the main entry point for the nav2 command-line application.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use nav2::prelude::*;

/// nav2 - navigation data inspection tool
#[derive(Parser)]
#[command(name = "nav2")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show header fields and per-group counts of a .nav2 file
    Info {
        /// Path to the .nav2 file
        #[arg(env = "INPUT_NAV2")]
        file: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode every .nav2 file under the given paths and report failures
    Check {
        /// Files or directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Treat an unknown header version as an error
        #[arg(long)]
        strict_version: bool,

        /// Fail on linked records that loop back onto themselves
        #[arg(long)]
        reject_revisits: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { file, json } => {
            cmd_info(&file, json)?;
        }
        Commands::Check {
            paths,
            strict_version,
            reject_revisits,
        } => {
            let options = DecodeOptions::new()
                .strict_version(strict_version)
                .reject_revisits(reject_revisits);
            cmd_check(&paths, &options)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_info(path: &Path, json: bool) -> Result<()> {
    let start = Instant::now();
    let file = nav2::open(path).with_context(|| format!("Failed to decode {}", path.display()))?;
    tracing::info!(elapsed = ?start.elapsed(), "decoded {}", path.display());

    let summary = file.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_summary(path, &summary);
    Ok(())
}

fn print_summary(path: &Path, summary: &FileSummary) {
    let origin = summary.origin;
    let divisors = summary.divisors;

    println!("File:        {}", path.display());
    println!("Version:     {}", summary.version);
    println!("Length:      {} bytes", summary.file_length);
    println!("Origin:      ({}, {}, {})", origin[0], origin[1], origin[2]);
    println!("Divisors:    {} / {} / {}", divisors.x, divisors.y, divisors.z);
    println!(
        "Entries:     {} ({} skipped)",
        summary.entries, summary.skipped_entries
    );
    println!("Manifest:    {} groups", summary.manifest_groups);
    println!("Section2:    {} records", summary.section2_records);
    println!();

    println!(
        "{:>5} {:>9} {:>7} {:>6} {:>9} {:>8} {:>10} {:>9} {:>10}",
        "group", "vertices", "faces", "quads", "waypoints", "wp-edges", "seg-points", "seg-edges",
        "seg-chunks"
    );
    for group in &summary.groups {
        print_group_row(&group.group_id.to_string(), group);
    }
    print_group_row("total", &summary.totals());
}

fn print_group_row(label: &str, group: &GroupSummary) {
    println!(
        "{:>5} {:>9} {:>7} {:>6} {:>9} {:>8} {:>10} {:>9} {:>10}",
        label,
        group.navmesh_vertices,
        group.navmesh_faces,
        group.navmesh_quads,
        group.waypoints,
        group.waypoint_edges,
        group.segment_points,
        group.segment_edges,
        group.segment_chunks
    );
}

fn cmd_check(paths: &[PathBuf], options: &DecodeOptions) -> Result<()> {
    let files = collect_nav2_files(paths)?;
    if files.is_empty() {
        anyhow::bail!("No .nav2 files found");
    }

    println!("Checking {} files...", files.len());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let failures: Vec<(&PathBuf, Error)> = files
        .par_iter()
        .filter_map(|path| {
            let result = nav2::open_with(path, options);
            pb.inc(1);
            match result {
                Ok(file) => {
                    tracing::debug!(entries = file.entries().len(), "ok {}", path.display());
                    None
                }
                Err(err) => Some((path, err)),
            }
        })
        .collect();
    pb.finish_and_clear();

    for (path, err) in &failures {
        eprintln!("{}: {}", path.display(), err);
    }
    println!(
        "Checked {} files in {:?} ({} failed)",
        files.len(),
        start.elapsed(),
        failures.len()
    );

    if !failures.is_empty() {
        anyhow::bail!("{} of {} files failed to decode", failures.len(), files.len());
    }
    Ok(())
}

/// Expand directories into the `.nav2` files below them.
fn collect_nav2_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }

        for entry in WalkDir::new(path).follow_links(true) {
            let entry = entry.with_context(|| format!("Failed to scan {}", path.display()))?;
            if entry.file_type().is_file() && has_nav2_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn has_nav2_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("nav2"))
}
