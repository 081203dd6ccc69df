mod messages;
mod parser;
mod record;
mod sink;
mod walk;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use record::ResourceRecord;

const DEFAULT_REPO_DIR: &str = "./professional-programming";
const DEFAULT_JSON_OUT: &str = "professional_programming_resources.json";
const DEFAULT_CSV_OUT: &str = "professional_programming_resources.csv";

/// Files loaded in parallel per batch before the sequential scan.
const LOAD_CHUNK: usize = 500;

#[derive(Parser)]
#[command(
    name = "pp_parser",
    about = "Extract list-item links from a tree of Markdown files",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    extract: ExtractArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk the repo, extract resources, write JSON and CSV (default)
    Extract(ExtractArgs),
    /// Summarize a channel exporter message log
    Messages {
        /// JSON-lines log written by the exporter
        input: PathBuf,
        /// Append normalized messages (links re-derived from text) here
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ExtractArgs {
    /// Root of the Markdown repository
    #[arg(long, env = "PP_REPO_DIR", default_value = DEFAULT_REPO_DIR)]
    repo_dir: PathBuf,
    /// JSON output path
    #[arg(long, env = "PP_JSON_OUT", default_value = DEFAULT_JSON_OUT)]
    json_out: PathBuf,
    /// CSV output path
    #[arg(long, env = "PP_CSV_OUT", default_value = DEFAULT_CSV_OUT)]
    csv_out: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        None => run_extract(&cli.extract),
        Some(Commands::Extract(args)) => run_extract(&args),
        Some(Commands::Messages { input, out }) => run_messages(&input, out.as_deref()),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("Done in {}", format_duration(elapsed));
    }

    result
}

fn run_extract(args: &ExtractArgs) -> Result<()> {
    let files = walk::markdown_files(&args.repo_dir)?;
    let repo_dir = std::fs::canonicalize(&args.repo_dir)
        .with_context(|| format!("Failed to resolve {}", args.repo_dir.display()))?;
    let json_out = std::path::absolute(&args.json_out)?;
    let csv_out = std::path::absolute(&args.csv_out)?;
    info!("Found {} markdown files under {}", files.len(), repo_dir.display());

    let records = process_files(&files, &args.repo_dir)?;
    info!("Extracted {} resources", records.len());

    sink::write_json(&records, &json_out)?;
    sink::write_csv(&records, &csv_out)?;

    println!("Parsed {} resources from {}", records.len(), repo_dir.display());
    println!("JSON saved to: {}", json_out.display());
    println!("CSV saved to: {}", csv_out.display());
    Ok(())
}

/// Load files in parallel batches, then scan them one by one in `files`
/// order, threading the next id from each file into the following one.
fn process_files(files: &[PathBuf], root: &Path) -> Result<Vec<ResourceRecord>> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut records = Vec::new();
    let mut next_id = 1;

    for chunk in files.chunks(LOAD_CHUNK) {
        let sources = chunk
            .par_iter()
            .map(|path| parser::load(path, root))
            .collect::<Result<Vec<_>>>()?;

        for source in &sources {
            let (file_records, next) = parser::scan_file(&source.text, &source.rel_path, next_id);
            records.extend(file_records);
            next_id = next;
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(records)
}

fn run_messages(input: &Path, out: Option<&Path>) -> Result<()> {
    let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let reader = BufReader::new(file);

    let summary = match out {
        Some(path) => {
            let mut sink = sink::JsonlSink::open(path)?;
            let summary = messages::normalize_log(reader, Some(&mut sink))?;
            println!("Appended {} messages to {}", sink.written(), path.display());
            summary
        }
        None => messages::normalize_log::<_, File>(reader, None)?,
    };
    summary.print();
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

// ── Tests ──
