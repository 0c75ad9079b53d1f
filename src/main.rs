//! mv-convert - CLI tool to convert MicroVu inspection programs.

use anyhow::{Context, Result};
use clap::Parser;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use mv_convert_rs::{ProgramRecord, Processor, Settings};

/// Convert MicroVu inspection programs to run against the 1Factory stack.
#[derive(Parser, Debug)]
#[command(name = "mv-convert")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input MicroVu program (.iwp)
    #[arg(short, long, conflicts_with = "batch")]
    input: Option<PathBuf>,

    /// Text file listing program paths to convert in bulk
    #[arg(short, long)]
    batch: Option<PathBuf>,

    /// Resolved settings file (JSON)
    #[arg(short, long)]
    settings: PathBuf,

    /// Operation number stamped into prompts and paths
    #[arg(long, default_value = "10")]
    op: String,

    /// Revision letter stamped into prompts and paths
    #[arg(long, default_value = "A")]
    rev: String,

    /// SmartProfile project name for profile programs
    #[arg(long, default_value = "")]
    sp_project: String,

    /// Initials recorded in the conversion comment
    #[arg(long)]
    initials: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Operation number embedded in a program file name, e.g. `446007_OP20_END.iwp`.
static OP_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[ _-]OP *(\d+).*\.IWP$").unwrap());

/// Revision letter embedded in a directory name, e.g. `446007 REVB`.
static REV_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)REV *(\w+)").unwrap());

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let settings_text = fs::read_to_string(&args.settings)
        .with_context(|| format!("Failed to read {}", args.settings.display()))?;
    let settings: Settings = serde_json::from_str(&settings_text)
        .with_context(|| format!("Failed to parse {}", args.settings.display()))?;

    let processor = Processor::new(settings, &args.initials);

    match (&args.input, &args.batch) {
        (Some(input), None) => convert_single(&processor, input, &args),
        (None, Some(list)) => convert_batch(&processor, list),
        _ => anyhow::bail!("Provide either --input or --batch"),
    }
}

fn convert_single(processor: &Processor, input: &Path, args: &Args) -> Result<()> {
    info!("Processing: {}", input.display());
    let mut record = ProgramRecord::load(input, &args.op, &args.rev, &args.sp_project)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    processor
        .process_file(&mut record)
        .with_context(|| format!("Failed to convert {}", input.display()))?;
    info!("Converted: {}", input.display());
    Ok(())
}

fn convert_batch(processor: &Processor, list: &Path) -> Result<()> {
    let listing =
        fs::read_to_string(list).with_context(|| format!("Failed to read {}", list.display()))?;

    let mut records = Vec::new();
    for line in listing.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let path = PathBuf::from(line);
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let directory_name = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        let op_number = parse_op_number(&file_name);
        let rev_letter = parse_rev_letter(directory_name);

        // SmartProfile projects in bulk runs are named after the program.
        match ProgramRecord::load(&path, &op_number, &rev_letter, &file_name) {
            Ok(record) => records.push(record),
            Err(e) => {
                error!("FilePath:{}: {}", path.display(), e);
            }
        }
    }

    let total = records.len();
    let outcome = processor.process_files(records);
    info!(
        "Converted {} of {} program(s), {} failure(s)",
        outcome.converted,
        total,
        outcome.failures.len()
    );
    if !outcome.failures.is_empty() {
        warn!("Failed programs:");
        for (path, e) in &outcome.failures {
            warn!("  {}: {}", path.display(), e);
        }
    }
    Ok(())
}

/// Operation number from the file name; programs without one run at OP 10.
fn parse_op_number(file_name: &str) -> String {
    OP_REGEX
        .captures(file_name)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| "10".to_string())
}

/// Revision letter from the containing directory name; defaults to A.
fn parse_rev_letter(directory_name: &str) -> String {
    REV_REGEX
        .captures(directory_name)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| "A".to_string())
}
