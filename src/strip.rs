//! Tag-content stripping for surviving pages.

use once_cell::sync::Lazy;
use regex::Regex;

static P_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<p[^>]*>.*?</p>").unwrap());
static B_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<b[^>]*>.*?</b>").unwrap());

/// Remove every `<p ...>...</p>` span, then every `<b ...>...</b>` span,
/// tags and content together.
///
/// Matches are shortest-first and non-overlapping, and spans may cross line
/// boundaries. This is a textual transform, not a DOM operation: an opening
/// tag pairs with the nearest following closing tag of the same name, so
/// nested or malformed markup is taken as-is. Stripping an already-stripped
/// document is a no-op.
pub fn strip_tag_content(html: &str) -> String {
    let stripped = P_SPAN.replace_all(html, "");
    B_SPAN.replace_all(&stripped, "").into_owned()
}
