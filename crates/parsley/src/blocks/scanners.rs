//! Block start and end scanners
//!
//! Every scanner looks at a line from its first non-space character onward.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::inlines::html::{CLOSING_TAG, OPEN_TAG};

/// Tag names that start an HTML block of kind 6
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "search", "section",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

static RAW_TEXT_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^<(?:script|pre|style|textarea)(?:[ \t>]|$)").expect("raw text start pattern")
});

static RAW_TEXT_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</(?:script|pre|style|textarea)>").expect("raw text end pattern")
});

static BLOCK_TAG_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^</?([A-Za-z][A-Za-z0-9]*)(?:[ \t>]|/>|$)").expect("block tag pattern")
});

static COMPLETE_TAG_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(?:{}|{})[ \t]*$", OPEN_TAG, CLOSING_TAG))
        .expect("complete tag pattern")
});

/// Which of the HTML block kinds a line starts, if any
///
/// Kinds 1-5 end on a line containing their end marker, 6 and 7 end at a
/// blank line. Kind 7 cannot interrupt a paragraph.
pub(crate) fn html_block_start(text: &str, interrupts_paragraph: bool) -> Option<u8> {
    if !text.starts_with('<') {
        return None;
    }
    if RAW_TEXT_START.is_match(text) {
        return Some(1);
    }
    if text.starts_with("<!--") {
        return Some(2);
    }
    if text.starts_with("<?") {
        return Some(3);
    }
    if text.starts_with("<![CDATA[") {
        return Some(5);
    }
    if text.len() > 2 && text.starts_with("<!") && text.as_bytes()[2].is_ascii_alphabetic() {
        return Some(4);
    }
    if let Some(caps) = BLOCK_TAG_START.captures(text) {
        let name = caps[1].to_ascii_lowercase();
        if BLOCK_TAGS.contains(&name.as_str()) {
            return Some(6);
        }
    }
    if !interrupts_paragraph && COMPLETE_TAG_LINE.is_match(text) {
        return Some(7);
    }
    None
}

/// Whether a line closes an HTML block of the given kind
pub(crate) fn html_block_end(kind: u8, text: &str) -> bool {
    match kind {
        1 => RAW_TEXT_END.is_match(text),
        2 => text.contains("-->"),
        3 => text.contains("?>"),
        4 => text.contains('>'),
        5 => text.contains("]]>"),
        _ => false,
    }
}

/// `***`, `---` or `___`, optionally spaced
pub(crate) fn thematic_break(text: &str) -> bool {
    let mut marker = None;
    let mut count = 0;
    for b in text.bytes() {
        match b {
            b' ' | b'\t' => {}
            b'*' | b'-' | b'_' if marker.is_none() || marker == Some(b) => {
                marker = Some(b);
                count += 1;
            }
            _ => return false,
        }
    }
    count >= 3
}

/// ATX heading opener: the level and the byte length of the `#` run
pub(crate) fn atx_heading(text: &str) -> Option<(u8, usize)> {
    let hashes = text.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    match text.as_bytes().get(hashes) {
        None | Some(b' ' | b'\t') => Some((hashes as u8, hashes)),
        _ => None,
    }
}

/// Strip the optional closing `#` sequence and surrounding space from ATX
/// heading content
pub(crate) fn atx_content(text: &str) -> &str {
    let text = text.trim_matches(|c| c == ' ' || c == '\t');
    let without_hashes = text.trim_end_matches('#');
    if without_hashes.is_empty() {
        return "";
    }
    if without_hashes.ends_with(&[' ', '\t'][..]) {
        without_hashes.trim_end_matches(|c| c == ' ' || c == '\t')
    } else {
        text
    }
}

/// Setext underline: heading level 1 for `=`, 2 for `-`
pub(crate) fn setext_underline(text: &str) -> Option<u8> {
    let marker = *text.as_bytes().first()?;
    let level = match marker {
        b'=' => 1,
        b'-' => 2,
        _ => return None,
    };
    let rest = text.trim_start_matches(marker as char);
    if rest.bytes().all(|b| b == b' ' || b == b'\t') {
        Some(level)
    } else {
        None
    }
}

/// Code fence opener: fence character, fence length, raw info string
pub(crate) fn open_fence(text: &str) -> Option<(u8, usize, &str)> {
    let marker = *text.as_bytes().first()?;
    if marker != b'`' && marker != b'~' {
        return None;
    }
    let len = text.bytes().take_while(|b| *b == marker).count();
    if len < 3 {
        return None;
    }
    let info = &text[len..];
    if marker == b'`' && info.contains('`') {
        return None;
    }
    Some((marker, len, info.trim()))
}

/// Whether a line closes a fence opened with `marker` repeated `len` times
pub(crate) fn close_fence(text: &str, marker: u8, len: usize) -> bool {
    let count = text.bytes().take_while(|b| *b == marker).count();
    count >= len && text[count..].bytes().all(|b| b == b' ' || b == b'\t')
}

/// A list marker at the start of `text`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListMarker {
    pub ordered: bool,
    /// `-`, `+` or `*` for bullets, `.` or `)` for ordinals
    pub delimiter: u8,
    pub start: u32,
    /// Byte length of the marker itself
    pub width: usize,
}

impl ListMarker {
    /// Whether an item with this marker continues a list opened by `other`
    pub fn same_list(&self, other: &ListMarker) -> bool {
        self.ordered == other.ordered && self.delimiter == other.delimiter
    }
}

/// Scan a bullet or ordinal list marker
///
/// When the item would interrupt a paragraph it must have content, and an
/// ordered one must start at 1.
pub(crate) fn list_marker(text: &str, interrupts_paragraph: bool) -> Option<ListMarker> {
    let bytes = text.as_bytes();
    let marker = match *bytes.first()? {
        b @ (b'-' | b'+' | b'*') => ListMarker {
            ordered: false,
            delimiter: b,
            start: 1,
            width: 1,
        },
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits > 9 {
                return None;
            }
            let delimiter = *bytes.get(digits)?;
            if delimiter != b'.' && delimiter != b')' {
                return None;
            }
            ListMarker {
                ordered: true,
                delimiter,
                start: text[..digits].parse().ok()?,
                width: digits + 1,
            }
        }
        _ => return None,
    };

    match bytes.get(marker.width) {
        None | Some(b' ' | b'\t') => {}
        _ => return None,
    }

    if interrupts_paragraph {
        let empty = text[marker.width..].trim_matches(&[' ', '\t'][..]).is_empty();
        if empty || (marker.ordered && marker.start != 1) {
            return None;
        }
    }
    Some(marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thematic_break() {
        assert!(thematic_break("***"));
        assert!(thematic_break("- - -"));
        assert!(thematic_break("_____   "));
        assert!(!thematic_break("**"));
        assert!(!thematic_break("*-*"));
        assert!(!thematic_break("--- a"));
    }

    #[test]
    fn test_atx_heading() {
        assert_eq!(atx_heading("# Title"), Some((1, 1)));
        assert_eq!(atx_heading("###"), Some((3, 3)));
        assert_eq!(atx_heading("####### seven"), None);
        assert_eq!(atx_heading("#hashtag"), None);
    }

    #[test]
    fn test_atx_content() {
        assert_eq!(atx_content(" Title ##  "), "Title");
        assert_eq!(atx_content(" Title#"), "Title#");
        assert_eq!(atx_content(" ### "), "");
        assert_eq!(atx_content(" a # b "), "a # b");
    }

    #[test]
    fn test_setext_underline() {
        assert_eq!(setext_underline("==="), Some(1));
        assert_eq!(setext_underline("-  "), Some(2));
        assert_eq!(setext_underline("= ="), None);
        assert_eq!(setext_underline("--a"), None);
    }

    #[test]
    fn test_fences() {
        assert_eq!(open_fence("```rust "), Some((b'`', 3, "rust")));
        assert_eq!(open_fence("~~~~ a`b"), Some((b'~', 4, "a`b")));
        assert_eq!(open_fence("``` a`b"), None);
        assert_eq!(open_fence("``"), None);
        assert!(close_fence("````  ", b'`', 3));
        assert!(!close_fence("``", b'`', 3));
        assert!(!close_fence("``` x", b'`', 3));
    }

    #[test]
    fn test_list_markers() {
        let bullet = list_marker("- item", false).unwrap();
        assert!(!bullet.ordered);
        assert_eq!(bullet.width, 1);

        let ordinal = list_marker("12) item", false).unwrap();
        assert!(ordinal.ordered);
        assert_eq!((ordinal.start, ordinal.delimiter, ordinal.width), (12, b')', 3));

        assert_eq!(list_marker("-item", false), None);
        assert_eq!(list_marker("1234567890. x", false), None);
        assert!(list_marker("-", false).is_some());
    }

    #[test]
    fn test_list_marker_interrupting_paragraph() {
        assert!(list_marker("-", true).is_none());
        assert!(list_marker("2. two", true).is_none());
        assert!(list_marker("1. one", true).is_some());
        assert!(list_marker("* x", true).is_some());
    }

    #[test]
    fn test_html_block_starts() {
        assert_eq!(html_block_start("<script>", false), Some(1));
        assert_eq!(html_block_start("<PRE class=\"x\">", false), Some(1));
        assert_eq!(html_block_start("<!-- c", false), Some(2));
        assert_eq!(html_block_start("<?php", false), Some(3));
        assert_eq!(html_block_start("<!DOCTYPE html>", false), Some(4));
        assert_eq!(html_block_start("<![CDATA[", false), Some(5));
        assert_eq!(html_block_start("<div class=\"a\">", false), Some(6));
        assert_eq!(html_block_start("</table>", true), Some(6));
        assert_eq!(html_block_start("<custom-tag a=\"1\">", false), Some(7));
        assert_eq!(html_block_start("<custom-tag a=\"1\">", true), None);
        assert_eq!(html_block_start("<span>text", false), None);
        assert_eq!(html_block_start("<divx>", true), None);
    }

    #[test]
    fn test_html_block_ends() {
        assert!(html_block_end(1, "x</SCRIPT> y"));
        assert!(html_block_end(2, "-->"));
        assert!(!html_block_end(2, "->"));
        assert!(!html_block_end(6, "</div>"));
    }
}
