//! Document tree
//!
//! Block and inline nodes produced by the parser and consumed by the renderer.
//! Every parent owns its children outright; nothing points back up the tree.

/// Column alignment parsed from a table delimiter row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// `---`
    #[default]
    None,
    /// `:---`
    Left,
    /// `:---:`
    Center,
    /// `---:`
    Right,
}

impl Alignment {
    /// The CSS/HTML keyword for this alignment, if any
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            Alignment::None => None,
            Alignment::Left => Some("left"),
            Alignment::Center => Some("center"),
            Alignment::Right => Some("right"),
        }
    }
}

/// A block-level node
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Root document container
    Document(Vec<Block>),

    /// Marks where a front-matter block was split off; renders nothing
    FrontMatter(String),

    /// Heading with level (1-6) and inline content
    Heading {
        level: u8,
        content: Vec<Inline>,
    },

    /// Paragraph containing inline content
    Paragraph(Vec<Inline>),

    /// Block quote containing nested blocks
    BlockQuote(Vec<Block>),

    /// List (ordered or unordered)
    List {
        ordered: bool,
        start: u32,
        tight: bool,
        items: Vec<ListItem>,
    },

    /// Fenced or indented code block
    CodeBlock {
        info: Option<String>,
        code: String,
        fenced: bool,
    },

    /// Thematic break (horizontal rule)
    ThematicBreak,

    /// GFM table with per-column alignment
    Table {
        alignments: Vec<Alignment>,
        headers: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
    },

    /// Raw HTML block, kept verbatim
    HtmlBlock(String),
}

/// A list item containing blocks
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub content: Vec<Block>,
}

impl ListItem {
    pub fn new(content: Vec<Block>) -> Self {
        Self { content }
    }

    pub fn from_inlines(inlines: Vec<Inline>) -> Self {
        Self {
            content: vec![Block::Paragraph(inlines)],
        }
    }

    /// The task marker state, if the item's first paragraph opens with one
    pub fn task(&self) -> Option<bool> {
        match self.content.first() {
            Some(Block::Paragraph(inlines)) => match inlines.first() {
                Some(Inline::TaskListMarker(checked)) => Some(*checked),
                _ => None,
            },
            _ => None,
        }
    }
}

/// An inline node
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Plain text (unescaped)
    Text(String),

    /// Emphasis (italic)
    Emphasis(Vec<Inline>),

    /// Strong emphasis (bold)
    Strong(Vec<Inline>),

    /// `~~deleted~~`
    Strikethrough(Vec<Inline>),

    /// Inline code
    Code(String),

    /// Link with content, destination, and optional title
    Link {
        content: Vec<Inline>,
        url: String,
        title: Option<String>,
    },

    /// Image with alt text, source, and optional title
    Image {
        alt: String,
        url: String,
        title: Option<String>,
    },

    /// `<https://example.com>` or a bare GFM URL
    Autolink { url: String, text: String },

    /// Raw HTML inline
    HtmlInline(String),

    /// Hard line break
    LineBreak,

    /// Line ending inside a paragraph
    SoftBreak,

    /// `[ ]` / `[x]` at the start of a task list item
    TaskListMarker(bool),
}

impl Inline {
    /// Append the text a reader would see, without markup
    pub fn push_plain_text(&self, out: &mut String) {
        match self {
            Inline::Text(text) | Inline::Code(text) => out.push_str(text),
            Inline::Strong(inlines)
            | Inline::Emphasis(inlines)
            | Inline::Strikethrough(inlines)
            | Inline::Link {
                content: inlines, ..
            } => {
                for inline in inlines {
                    inline.push_plain_text(out);
                }
            }
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::Autolink { text, .. } => out.push_str(text),
            Inline::LineBreak | Inline::SoftBreak => out.push(' '),
            Inline::HtmlInline(_) | Inline::TaskListMarker(_) => {}
        }
    }
}

/// Plain text of an inline sequence (image alt text, document titles)
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        inline.push_plain_text(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_flattens_markup() {
        let inlines = vec![
            Inline::Text("Hello ".to_string()),
            Inline::Strong(vec![Inline::Emphasis(vec![Inline::Text(
                "big".to_string(),
            )])]),
            Inline::SoftBreak,
            Inline::Code("world".to_string()),
        ];
        assert_eq!(plain_text(&inlines), "Hello big world");
    }

    #[test]
    fn test_task_marker_lookup() {
        let item = ListItem::from_inlines(vec![
            Inline::TaskListMarker(true),
            Inline::Text("done".to_string()),
        ]);
        assert_eq!(item.task(), Some(true));
        assert_eq!(ListItem::from_inlines(vec![]).task(), None);
    }
}
