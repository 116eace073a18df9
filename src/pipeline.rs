//! The per-archive pipeline and the batch driver.
//!
//! Each archive runs through five sequential steps: unpack, filter pages,
//! update manifest, repack, clean up. Archives are independent (each gets
//! its own scratch subdirectory and output file), so the batch driver runs
//! them concurrently and a failure in one never aborts the others.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{error, info};

use crate::archive;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::manifest;
use crate::page;
use crate::util::walk_files;

/// Pipeline step names used in logs and outcome reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Unpack,
    FilterPages,
    UpdateManifest,
    Repack,
    Cleanup,
}

impl Step {
    pub fn name(self) -> &'static str {
        match self {
            Step::Unpack => "unpack",
            Step::FilterPages => "filter-pages",
            Step::UpdateManifest => "update-manifest",
            Step::Repack => "repack",
            Step::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of one archive's pipeline run.
#[derive(Debug)]
pub struct Outcome {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Number of pages deleted for lacking a JPEG reference.
    pub removed_pages: usize,
    /// The step that failed and its error, when the pipeline did not finish.
    pub error: Option<(Step, Error)>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Run the full pipeline for a single archive.
///
/// The scratch subdirectory and the output file are both derived from the
/// archive's base name, so concurrent runs over distinct inputs never
/// collide. On failure the scratch tree is left in place for inspection.
pub fn process_epub(input: &Path, scratch_root: &Path, output_dir: &Path) -> Outcome {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());
    let scratch = scratch_root.join(&stem);
    let output = output_dir.join(format!("{stem}_processed.epub"));

    match run_steps(input, &scratch, &output) {
        Ok(removed_pages) => Outcome {
            input: input.to_path_buf(),
            output,
            removed_pages,
            error: None,
        },
        Err(failure) => Outcome {
            input: input.to_path_buf(),
            output,
            removed_pages: 0,
            error: Some(failure),
        },
    }
}

fn run_steps(
    input: &Path,
    scratch: &Path,
    output: &Path,
) -> std::result::Result<usize, (Step, Error)> {
    archive::unpack(input, scratch).map_err(|e| (Step::Unpack, e))?;

    let removed = page::filter_pages(scratch).map_err(|e| (Step::FilterPages, e))?;

    let manifest_path = manifest::find_manifest(scratch).map_err(|e| (Step::UpdateManifest, e))?;
    manifest::update_manifest(&manifest_path, &removed).map_err(|e| (Step::UpdateManifest, e))?;

    archive::repack(scratch, output).map_err(|e| (Step::Repack, e))?;
    archive::clean_scratch(scratch).map_err(|e| (Step::Cleanup, e))?;

    Ok(removed.len())
}

/// Run the pipeline over every `.epub` file under the configured input
/// directory, one concurrent task per archive.
///
/// Per-archive failures are captured in the returned [`Outcome`]s; only a
/// failure to set up the run itself (unreadable input directory, uncreatable
/// output or scratch root) is returned as an error.
pub fn run_batch(config: &Config) -> Result<Vec<Outcome>> {
    fs::create_dir_all(&config.scratch_dir)?;
    fs::create_dir_all(&config.output_dir)?;

    let inputs = find_epubs(&config.input_dir)?;
    info!(
        count = inputs.len(),
        input_dir = %config.input_dir.display(),
        "starting batch"
    );

    if let Some(n) = config.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .ok(); // ignore error if a pool was already built
    }

    let outcomes: Vec<Outcome> = inputs
        .par_iter()
        .map(|input| {
            let outcome = process_epub(input, &config.scratch_dir, &config.output_dir);
            match &outcome.error {
                None => info!(
                    archive = %input.display(),
                    removed = outcome.removed_pages,
                    output = %outcome.output.display(),
                    "processed"
                ),
                Some((step, e)) => error!(
                    archive = %input.display(),
                    step = %step,
                    "pipeline failed: {e}"
                ),
            }
            outcome
        })
        .collect();

    Ok(outcomes)
}

fn find_epubs(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(walk_files(dir)?
        .into_iter()
        .filter(|path| path.extension().is_some_and(|ext| ext == "epub"))
        .collect())
}
