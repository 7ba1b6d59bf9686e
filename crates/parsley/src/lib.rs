//! # parsley
//!
//! Convert Markdown with optional front matter to HTML.
//!
//! The parser implements CommonMark block and inline structure plus the GFM
//! extensions (tables, strikethrough, extended autolinks, task lists). Each
//! call is self-contained: there is no global state, so conversions can run
//! on as many threads as needed.
//!
//! ## Design
//!
//! ```text
//!  raw text ──▶ frontmatter::split ─┬─▶ metadata::parse_metadata
//!                                   └─▶ block parser ──▶ inline parser
//!                                                            │
//!  Document ◀── Document::assemble ◀── render ◀── Block tree ◀┘
//! ```
//!
//! Malformed Markdown never fails; it degrades to literal text. The only
//! error is [`ParsleyError::ConversionFailed`], raised when the renderer
//! meets a tree it cannot represent.
//!
//! ## Example (HTML only)
//!
//! ```rust
//! use parsley::Options;
//!
//! let html = parsley::html("Hello *world*", &Options::default()).unwrap();
//! assert_eq!(html, "<p>Hello <em>world</em></p>\n");
//! ```
//!
//! ## Example (document with front matter)
//!
//! ```rust
//! use parsley::{Flag, Options};
//!
//! let source = "---\nauthor: Kevin\n---\n# Release notes\n\n- [x] ~~bugs~~";
//! let options = Options::from_flags(&[Flag::Tasklist, Flag::Strikethrough]);
//! let doc = parsley::parse(source, &options).unwrap();
//!
//! assert_eq!(doc.title(), "Release notes");
//! assert_eq!(doc.get("author"), Some("Kevin"));
//! assert!(doc.body().contains("<del>bugs</del>"));
//! ```

mod blocks;
pub mod document;
pub mod frontmatter;
mod inlines;
pub mod metadata;
pub mod refs;
mod service;

pub use document::Document;
pub use metadata::Metadata;
pub use parsley_core::{
    plain_text, render, Alignment, Block, Flag, Inline, ListItem, Options, RenderError,
    UnknownFlag,
};
pub use service::Parsley;

/// Error type for parsley operations
#[derive(Debug, thiserror::Error)]
pub enum ParsleyError {
    #[error("Conversion failed: {0}")]
    ConversionFailed(#[from] RenderError),
}

pub type Result<T> = std::result::Result<T, ParsleyError>;

/// Convert Markdown to HTML, without metadata or title extraction
pub fn html(content: &str, options: &Options) -> Result<String> {
    Parsley::with_options(*options).html(content)
}

/// Convert a document, splitting off front matter and finding its title
pub fn parse(content: &str, options: &Options) -> Result<Document> {
    Parsley::with_options(*options).parse(content)
}

/// Parse Markdown into a block tree without rendering it
pub fn parse_tree(content: &str, options: &Options) -> Block {
    blocks::parse_blocks(content, options)
}
