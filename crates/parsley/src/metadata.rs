//! `key: value` metadata
//!
//! Front matter is read line by line. Each line splits on its first `:`;
//! later colons stay in the value. Lines without a colon or with an empty key
//! are skipped. When a key repeats, the first value is kept.

use indexmap::IndexMap;

/// Ordered metadata mapping, in first-seen key order
pub type Metadata = IndexMap<String, String>;

/// Parse a front-matter block into an ordered mapping
///
/// ```rust
/// use parsley::metadata::parse_metadata;
///
/// let meta = parse_metadata("author: Kevin\ntags: Swift\nauthor: Someone else");
/// assert_eq!(meta["author"], "Kevin");
/// assert_eq!(meta["tags"], "Swift");
/// assert_eq!(meta.len(), 2);
/// ```
pub fn parse_metadata(block: &str) -> Metadata {
    let mut metadata = Metadata::new();
    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        metadata
            .entry(key.to_string())
            .or_insert_with(|| value.trim().to_string());
    }
    metadata
}

/// Write a mapping back out as a front-matter block (without delimiters)
pub fn render_metadata_block(metadata: &Metadata) -> String {
    let mut out = String::new();
    for (key, value) in metadata {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
    out
}
