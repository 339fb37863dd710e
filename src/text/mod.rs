//! Text heuristics shared by nodes and transforms.
//!
//! - Token counting: a fixed, whitespace/punctuation-aware rule
//! - Bullet and terminal-punctuation detection for list reassembly
//! - Page-number detection and text normalization for metadata filtering

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A token is a run of word characters or a single punctuation/symbol character
    static ref RE_TOKEN: Regex = Regex::new(r"\w+|[^\w\s]").unwrap();

    /// Bullet glyphs, dashes, and short numbered/lettered list markers
    static ref RE_BULLET: Regex = Regex::new(
        r"^\s*(?:[•●○◦▪▫■□‣⁃∙·\-\*–—]|\(?\d{1,3}[.)]|\(?[a-zA-Z][.)])\s+\S"
    ).unwrap();

    /// Decorated page labels: "Page 3", "page 3 of 10", "3 / 10", "- 4 -"
    static ref RE_PAGE_LABEL: Regex = Regex::new(
        r"(?i)^\s*(?:(?:page\s+|p\.\s*)(?:\d{1,4}|[ivx]{1,6})(?:\s*(?:of|/)\s*\d{1,4})?|\d{1,4}\s*(?:of|/)\s*\d{1,4}|[-–—]\s*(?:\d{1,4}|[ivx]{1,6})\s*[-–—])\s*$"
    ).unwrap();

    /// Bare page numbers: "12", "iv"
    static ref RE_BARE_PAGE_NUMBER: Regex = Regex::new(r"(?i)^\s*(?:\d{1,4}|[ivx]{1,6})\s*$").unwrap();

    static ref RE_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Count tokens in `text`.
///
/// Joining two texts with whitespace yields exactly the sum of their counts,
/// which keeps node token counts additive under merge.
///
/// # Examples
///
/// ```
/// use doc_consolidate::text::count_tokens;
///
/// assert_eq!(count_tokens("Hello, world!"), 4);
/// assert_eq!(count_tokens(""), 0);
/// ```
pub fn count_tokens(text: &str) -> usize {
    RE_TOKEN.find_iter(text).count()
}

/// Whether the text opens with a bullet or list marker followed by content.
pub fn starts_with_bullet(text: &str) -> bool {
    RE_BULLET.is_match(text)
}

/// Whether the last non-empty line ends in sentence-terminating punctuation.
///
/// Closing quotes and brackets after the punctuation are ignored.
pub fn is_terminated(text: &str) -> bool {
    let trimmed = text
        .trim_end()
        .trim_end_matches(|c: char| matches!(c, '"' | '\'' | ')' | ']' | '”' | '’' | '*'));
    trimmed.ends_with(['.', '!', '?', ';', ':', '。'])
}

/// Whether the text is a decorated page label such as "Page 3" or "3 of 10".
///
/// Unlike a bare number these are unambiguous wherever they sit on the page.
pub fn is_page_label(text: &str) -> bool {
    RE_PAGE_LABEL.is_match(text)
}

/// Whether the text is nothing but a page number marker, bare or decorated.
///
/// A bare "12" or "iv" is only a page number by position; callers check that.
pub fn is_page_number(text: &str) -> bool {
    is_page_label(text) || RE_BARE_PAGE_NUMBER.is_match(text)
}

/// Normalize text for repetition detection: trimmed, lowercased, whitespace collapsed.
pub fn normalize(text: &str) -> String {
    RE_WHITESPACE
        .replace_all(text.trim(), " ")
        .to_lowercase()
}
