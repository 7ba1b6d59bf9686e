//! Front matter splitting
//!
//! A document may open with a metadata block fenced by `---` lines:
//!
//! ```markdown
//! ---
//! title: My Document
//! author: Kevin
//! ---
//!
//! # Document Content
//! ```
//!
//! The block may also be closed by `...`. Anything else at the start of the
//! input means there is no front matter and the whole input is body.
//!
//! # Usage
//!
//! ```rust
//! use parsley::frontmatter::split;
//!
//! let (block, body) = split("---\ntitle: Test\n---\nBody");
//! assert_eq!(block, Some("title: Test"));
//! assert_eq!(body, "Body");
//!
//! let (block, body) = split("# Just Markdown");
//! assert_eq!(block, None);
//! assert_eq!(body, "# Just Markdown");
//! ```

const BOM: char = '\u{feff}';
const OPEN: &str = "---";
const CLOSE: [&str; 2] = ["---", "..."];

/// Split raw text into the front-matter block (if any) and the body
///
/// Never fails: an opener without a closing delimiter is not front matter,
/// and the whole input comes back as body.
pub fn split(content: &str) -> (Option<&str>, &str) {
    let content = content.strip_prefix(BOM).unwrap_or(content);

    let Some((first, rest_start)) = next_line(content, 0) else {
        return (None, content);
    };
    if first.trim_end() != OPEN {
        return (None, content);
    }

    let mut pos = rest_start;
    while let Some((line, next)) = next_line(content, pos) {
        if CLOSE.contains(&line.trim_end()) {
            let block = trim_line_ending(&content[rest_start..pos]);
            return (Some(block), &content[next..]);
        }
        pos = next;
    }

    log::debug!("Front matter opener has no closing delimiter, treating input as body");
    (None, content)
}

/// The body of a document with any front matter removed
pub fn strip(content: &str) -> &str {
    split(content).1
}

/// The line starting at `start` (without its ending) and the offset of the
/// line after it
fn next_line(content: &str, start: usize) -> Option<(&str, usize)> {
    if start >= content.len() {
        return None;
    }
    let rest = &content[start..];
    match rest.find('\n') {
        Some(i) => Some((rest[..i].trim_end_matches('\r'), start + i + 1)),
        None => Some((rest, content.len())),
    }
}

fn trim_line_ending(block: &str) -> &str {
    let block = block.strip_suffix('\n').unwrap_or(block);
    block.strip_suffix('\r').unwrap_or(block)
}
