//! `content.opf` manifest updates.
//!
//! The manifest is edited as text, matching the rest of the pipeline: an
//! `<item>` element is dropped when its `href` equals a removal key and its
//! `media-type` is `text/html`. Everything else in the file is preserved
//! byte for byte.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::util::walk_files;

const MANIFEST_NAME: &str = "content.opf";

/// Locate `content.opf` anywhere under the unpacked tree.
///
/// The manifest is not always at a fixed depth, so the whole tree is
/// searched; the first match in walk order wins.
pub fn find_manifest<P: AsRef<Path>>(root: P) -> Result<PathBuf> {
    let root = root.as_ref();
    walk_files(root)?
        .into_iter()
        .find(|path| path.file_name().is_some_and(|name| name == MANIFEST_NAME))
        .ok_or_else(|| Error::ManifestNotFound(root.to_path_buf()))
}

/// Remove every `<item>` whose `href` equals one of the removal keys and
/// whose `media-type` is `text/html`. Items with the same `href` but a
/// different media type are kept.
pub fn remove_items(manifest: &str, removed: &[String]) -> String {
    let mut content = manifest.to_string();
    for key in removed {
        let pattern = format!(r#"<item\b[^>]*\bhref="{}"[^>]*>"#, regex::escape(key));
        let item = Regex::new(&pattern).expect("escaped key yields a valid pattern");
        content = item
            .replace_all(&content, |caps: &regex::Captures| {
                if caps[0].contains(r#"media-type="text/html""#) {
                    String::new()
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned();
    }
    content
}

/// Rewrite the manifest at `path`, dropping items for the removed pages.
pub fn update_manifest<P: AsRef<Path>>(path: P, removed: &[String]) -> Result<()> {
    if removed.is_empty() {
        return Ok(());
    }
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let updated = remove_items(&content, removed);
    debug!(manifest = %path.display(), keys = removed.len(), "rewriting manifest");
    fs::write(path, updated)?;
    Ok(())
}
