//! Markup stripping for free-text survey comments.

use regex::Regex;
use std::sync::OnceLock;

fn tag_regex() -> &'static Regex {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    // Non-greedy, single line: `<b>a</b>` loses both tags, not the text between.
    TAG_RE.get_or_init(|| Regex::new(r"<.*?>").expect("tag pattern is valid"))
}

/// Removes anything that looks like a `<...>` tag, then drops embedded newlines.
pub fn clean_html(text: &str) -> String {
    tag_regex().replace_all(text, "").replace('\n', "")
}
