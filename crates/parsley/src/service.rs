//! Parsley - the main entry point for Markdown to HTML conversion.

use parsley_core::{plain_text, render, Block, Options};

use crate::blocks::parse_blocks;
use crate::document::Document;
use crate::frontmatter;
use crate::metadata::{parse_metadata, Metadata};
use crate::Result;

/// Converts Markdown to HTML with a fixed set of options
///
/// Holds no state besides its options, so one instance can serve any number
/// of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parsley {
    options: Options,
}

impl Parsley {
    /// Create a converter with the default `{safe}` options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter with custom options
    pub fn with_options(options: Options) -> Self {
        Self { options }
    }

    /// Get the current options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Convert Markdown to HTML without looking for metadata or a title
    pub fn html(&self, content: &str) -> Result<String> {
        self.render(&parse_blocks(content, &self.options))
    }

    /// Convert a document with optional front matter
    ///
    /// The body's leading level-1 heading becomes the title and is left out
    /// of the rendered body. Without one, the `title` metadata value is used.
    pub fn parse(&self, content: &str) -> Result<Document> {
        let (front_matter, raw_body) = frontmatter::split(content);
        let metadata = front_matter.map(parse_metadata).unwrap_or_default();

        let mut blocks = match parse_blocks(raw_body, &self.options) {
            Block::Document(blocks) => blocks,
            other => vec![other],
        };
        let title = take_title(&mut blocks, &metadata);
        if let Some(block) = front_matter {
            blocks.insert(0, Block::FrontMatter(block.to_string()));
        }

        let body = self.render(&Block::Document(blocks))?;
        Ok(Document::assemble(
            title,
            raw_body,
            body.trim_matches('\n'),
            metadata,
        ))
    }

    fn render(&self, tree: &Block) -> Result<String> {
        render(tree, &self.options).map_err(|err| {
            log::warn!("Rendering failed: {}", err);
            err.into()
        })
    }
}

fn take_title(blocks: &mut Vec<Block>, metadata: &Metadata) -> String {
    if let Some(Block::Heading { level: 1, content }) = blocks.first() {
        let title = plain_text(content);
        blocks.remove(0);
        return title;
    }
    metadata.get("title").cloned().unwrap_or_default()
}
