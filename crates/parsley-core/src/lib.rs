//! parsley-core - Markdown document tree and HTML rendering
//!
//! This crate provides the data structures shared by the parser and the
//! renderer: block and inline nodes, the option flag set, HTML escaping and
//! the renderer itself. It does no parsing; see the `parsley` crate.
//!
//! # Architecture
//!
//! ```text
//!                    ┌──────────────┐
//! Markdown ──parse──▶│  Block tree  │──render──▶ HTML String
//!                    └──────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use parsley_core::{render, Block, Inline, Options};
//!
//! let ast = Block::Document(vec![
//!     Block::Heading {
//!         level: 1,
//!         content: vec![Inline::Text("Hello World".to_string())],
//!     },
//!     Block::Paragraph(vec![
//!         Inline::Text("This is ".to_string()),
//!         Inline::Strong(vec![Inline::Text("bold".to_string())]),
//!         Inline::Text(" text.".to_string()),
//!     ]),
//! ]);
//!
//! let html = render(&ast, &Options::default()).unwrap();
//! assert_eq!(html, "<h1>Hello World</h1>\n<p>This is <strong>bold</strong> text.</p>\n");
//! ```

mod ast;
pub mod escape;
mod options;
mod render;

pub use ast::{plain_text, Alignment, Block, Inline, ListItem};
pub use options::{Flag, Options, UnknownFlag};
pub use render::render;

/// Errors raised when a tree violates an invariant the renderer relies on
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Heading level {0} is outside 1..=6")]
    InvalidHeadingLevel(u8),

    #[error("Table row has {cells} cells but only {columns} columns")]
    MisalignedTable { columns: usize, cells: usize },

    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;
