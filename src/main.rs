//! epub-prune - batch EPUB page pruning

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use epub_prune::{Config, Outcome, run_batch};

#[derive(Parser)]
#[command(name = "epub-prune")]
#[command(version, about = "Prune imageless pages from EPUB archives", long_about = None)]
#[command(after_help = "EXAMPLES:
    epub-prune books/ -o out/           Process every .epub under books/
    epub-prune books/ -o out/ -j 4      Use four worker threads
    epub-prune books/ -o out/ --json    Machine-readable summary")]
struct Cli {
    /// Directory scanned recursively for .epub files
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Directory receiving one <name>_processed.epub per input
    #[arg(short, long, value_name = "DIR")]
    output_dir: PathBuf,

    /// Scratch root for per-archive extraction [default: <output-dir>/.scratch]
    #[arg(long, value_name = "DIR")]
    scratch_dir: Option<PathBuf>,

    /// Worker threads for the batch pool [default: one per CPU]
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Suppress the per-archive summary
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Serialize)]
struct SummaryEntry {
    input: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    removed_pages: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl SummaryEntry {
    fn from_outcome(outcome: &Outcome) -> Self {
        match &outcome.error {
            None => SummaryEntry {
                input: outcome.input.display().to_string(),
                status: "ok",
                output: Some(outcome.output.display().to_string()),
                removed_pages: Some(outcome.removed_pages),
                step: None,
                error: None,
            },
            Some((step, e)) => SummaryEntry {
                input: outcome.input.display().to_string(),
                status: "failed",
                output: None,
                removed_pages: None,
                step: Some(step.name()),
                error: Some(e.to_string()),
            },
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let scratch_dir = cli
        .scratch_dir
        .unwrap_or_else(|| cli.output_dir.join(".scratch"));

    let config = Config {
        input_dir: cli.input_dir,
        scratch_dir,
        output_dir: cli.output_dir,
        jobs: cli.jobs,
    };

    let outcomes = match run_batch(&config) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        print_json_summary(&outcomes);
    } else if !cli.quiet {
        print_summary(&outcomes);
    }

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    if !outcomes.is_empty() && failed == outcomes.len() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_summary(outcomes: &[Outcome]) {
    for outcome in outcomes {
        match &outcome.error {
            None => println!(
                "ok   {} -> {} ({} pages removed)",
                outcome.input.display(),
                outcome.output.display(),
                outcome.removed_pages
            ),
            Some((step, e)) => println!("FAIL {} at {step}: {e}", outcome.input.display()),
        }
    }
    let ok = outcomes.iter().filter(|o| o.is_success()).count();
    println!("{ok}/{} archives processed", outcomes.len());
}

fn print_json_summary(outcomes: &[Outcome]) {
    let entries: Vec<SummaryEntry> = outcomes.iter().map(SummaryEntry::from_outcome).collect();
    match serde_json::to_string_pretty(&entries) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("error: failed to serialize summary: {e}"),
    }
}
