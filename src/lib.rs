//! # epub-prune
//!
//! Batch processor for EPUB archives: deletes pages that carry no JPEG
//! image, strips `<p>`/`<b>` spans from the pages that remain, and rewrites
//! the package manifest so it only references surviving pages.
//!
//! Each archive runs through a five-step pipeline (unpack, filter pages,
//! update manifest, repack, clean up) in its own scratch directory, so a
//! batch of archives is processed concurrently with per-archive failure
//! isolation: one broken archive never stops the rest of the run.
//!
//! ## Quick Start
//!
//! ```no_run
//! use epub_prune::{Config, run_batch};
//!
//! let config = Config::new("books/", "scratch/", "out/");
//! for outcome in run_batch(&config)? {
//!     match &outcome.error {
//!         None => println!("{}: {} pages removed", outcome.input.display(), outcome.removed_pages),
//!         Some((step, e)) => eprintln!("{}: failed at {step}: {e}", outcome.input.display()),
//!     }
//! }
//! # Ok::<(), epub_prune::Error>(())
//! ```
//!
//! A single archive can also be processed directly with
//! [`process_epub`], which never panics on a bad archive: failures are
//! reported through the returned [`Outcome`].

pub mod archive;
pub mod config;
pub mod error;
pub mod manifest;
pub mod page;
pub mod pipeline;
pub mod strip;
pub(crate) mod util;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{Outcome, Step, process_epub, run_batch};
pub use strip::strip_tag_content;
