//! Batch run configuration.

use std::path::{Path, PathBuf};

/// Filesystem layout for a batch run, passed explicitly into
/// [`run_batch`](crate::run_batch) so the pipeline carries no global state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory scanned recursively for `.epub` input files.
    pub input_dir: PathBuf,
    /// Root under which each archive gets its own scratch subdirectory,
    /// named after the archive's base name.
    pub scratch_dir: PathBuf,
    /// Directory receiving one `<name>_processed.epub` per input.
    pub output_dir: PathBuf,
    /// Worker threads for the batch pool. `None` uses one per CPU.
    pub jobs: Option<usize>,
}

impl Config {
    pub fn new<P, Q, R>(input_dir: P, scratch_dir: Q, output_dir: R) -> Self
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        R: AsRef<Path>,
    {
        Config {
            input_dir: input_dir.as_ref().to_path_buf(),
            scratch_dir: scratch_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            jobs: None,
        }
    }

    /// Cap the batch pool at `n` worker threads.
    pub fn with_jobs(mut self, n: usize) -> Self {
        self.jobs = Some(n);
        self
    }
}
