//! Page scanning and filtering.
//!
//! Walks an unpacked archive for `page*.html` documents, deletes the ones
//! without a JPEG image reference, and strips tag content from the rest.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::strip::strip_tag_content;
use crate::util::walk_files;

static JPEG_IMG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<img[^>]+src="[^"]+\.jpeg""#).unwrap());

/// True when the document contains an `<img>` tag whose `src` value ends in
/// `.jpeg`, case-insensitively.
pub fn has_jpeg_image(html: &str) -> bool {
    JPEG_IMG.is_match(html)
}

/// Page documents are named `page*.html`, exact case.
fn is_page_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("page") && name.ends_with(".html"))
}

/// Filter the page documents under an unpacked archive.
///
/// Pages without a JPEG reference are deleted and their file names collected
/// as removal keys, in walk order. Surviving pages are rewritten in place
/// with `<p>`/`<b>` spans stripped. A tree with no page documents yields an
/// empty key list.
pub fn filter_pages<P: AsRef<Path>>(root: P) -> Result<Vec<String>> {
    let mut removed = Vec::new();

    for path in walk_files(root.as_ref())? {
        if !is_page_file(&path) {
            continue;
        }
        let content = fs::read_to_string(&path)?;
        if has_jpeg_image(&content) {
            fs::write(&path, strip_tag_content(&content))?;
        } else {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                removed.push(name.to_string());
            }
            debug!(page = %path.display(), "deleting page without JPEG reference");
            fs::remove_file(&path)?;
        }
    }

    Ok(removed)
}
