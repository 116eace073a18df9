//! Error types for epub-prune operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while processing an EPUB archive.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("no content.opf found under {0}")]
    ManifestNotFound(PathBuf),

    #[error("output file already exists: {0}")]
    OutputExists(PathBuf),

    #[error("archive entry escapes the extraction directory: {0}")]
    UnsafeEntryPath(String),
}

pub type Result<T> = std::result::Result<T, Error>;
