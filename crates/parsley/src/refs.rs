//! Link reference definitions
//!
//! Definitions are collected while blocks close, before any inline content
//! is parsed, so a reference may appear above its definition.

use indexmap::IndexMap;

use crate::inlines::links::{
    scan_link_destination, scan_link_label, scan_link_title, skip_spaces, skip_spaces_and_newline,
};

/// Destination and optional title behind a reference label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReference {
    pub url: String,
    pub title: Option<String>,
}

/// Normalized label → definition, first definition wins
#[derive(Debug, Clone, Default)]
pub struct LinkReferences {
    map: IndexMap<String, LinkReference>,
}

impl LinkReferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a definition unless the label is already defined
    pub fn insert(&mut self, label: &str, reference: LinkReference) -> bool {
        let key = normalize_label(label);
        if key.is_empty() || self.map.contains_key(&key) {
            return false;
        }
        self.map.insert(key, reference);
        true
    }

    pub fn get(&self, label: &str) -> Option<&LinkReference> {
        if self.map.is_empty() {
            return None;
        }
        self.map.get(&normalize_label(label))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Case-fold a label and collapse its internal whitespace
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .to_uppercase()
}

/// Strip definitions from the start of paragraph text
///
/// Returns how many bytes of `content` were definitions.
pub(crate) fn extract_definitions(content: &str, refs: &mut LinkReferences) -> usize {
    let mut consumed = 0;
    while content[consumed..].starts_with('[') {
        match parse_definition(&content[consumed..]) {
            Some((label, reference, len)) => {
                refs.insert(label, reference);
                consumed += len;
            }
            None => break,
        }
    }
    consumed
}

/// Parse one `[label]: destination "title"` definition
fn parse_definition(s: &str) -> Option<(&str, LinkReference, usize)> {
    let (label, mut pos) = scan_link_label(s)?;
    if s.as_bytes().get(pos) != Some(&b':') {
        return None;
    }
    pos += 1;
    pos += skip_spaces_and_newline(&s[pos..]);

    let (url, len) = scan_link_destination(&s[pos..])?;
    pos += len;
    let before_title = pos;

    let ws = skip_spaces_and_newline(&s[pos..]);
    if ws > 0 {
        if let Some((title, len)) = scan_link_title(&s[pos + ws..]) {
            let end = pos + ws + len;
            if let Some(line_end) = at_line_end(s, end) {
                let reference = LinkReference {
                    url,
                    title: Some(title),
                };
                return Some((label, reference, line_end));
            }
        }
    }

    let line_end = at_line_end(s, before_title)?;
    Some((label, LinkReference { url, title: None }, line_end))
}

/// If only spaces remain on the line starting at `pos`, the offset after it
fn at_line_end(s: &str, pos: usize) -> Option<usize> {
    let pos = pos + skip_spaces(&s[pos..]);
    match s.as_bytes().get(pos) {
        None => Some(pos),
        Some(b'\n') => Some(pos + 1),
        Some(_) => None,
    }
}
