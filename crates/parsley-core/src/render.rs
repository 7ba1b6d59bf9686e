//! HTML rendering
//!
//! Walks a block tree and writes HTML. Output follows the shape cmark-gfm
//! produces: every block starts on its own line and ends with `\n`.

use std::fmt::Write;

use crate::ast::{Alignment, Block, Inline, ListItem};
use crate::escape::{escape_href, escape_html, filter_tags, is_dangerous_url};
use crate::options::Options;
use crate::{RenderError, RenderResult};

const RAW_HTML_OMITTED: &str = "<!-- raw HTML omitted -->";

/// Render a block tree to an HTML string
///
/// An empty document renders to an empty string.
pub fn render(block: &Block, options: &Options) -> RenderResult<String> {
    let mut renderer = HtmlRenderer {
        options,
        out: String::with_capacity(4096),
    };
    renderer.block(block, false)?;
    Ok(renderer.out)
}

struct HtmlRenderer<'o> {
    options: &'o Options,
    out: String,
}

impl HtmlRenderer<'_> {
    /// Start a new line unless already at one
    fn cr(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn block(&mut self, block: &Block, tight: bool) -> RenderResult<()> {
        match block {
            Block::Document(blocks) => self.blocks(blocks, false)?,

            Block::FrontMatter(_) => {}

            Block::Heading { level, content } => {
                if !(1..=6).contains(level) {
                    return Err(RenderError::InvalidHeadingLevel(*level));
                }
                self.cr();
                write!(self.out, "<h{}>", level)?;
                self.inlines(content)?;
                write!(self.out, "</h{}>\n", level)?;
            }

            Block::Paragraph(inlines) => {
                if tight {
                    self.inlines(inlines)?;
                } else {
                    self.cr();
                    self.out.push_str("<p>");
                    self.inlines(inlines)?;
                    self.out.push_str("</p>\n");
                }
            }

            Block::BlockQuote(blocks) => {
                self.cr();
                self.out.push_str("<blockquote>\n");
                self.blocks(blocks, false)?;
                self.cr();
                self.out.push_str("</blockquote>\n");
            }

            Block::List {
                ordered,
                start,
                tight,
                items,
            } => self.list(*ordered, *start, *tight, items)?,

            Block::CodeBlock { info, code, .. } => self.code_block(info.as_deref(), code),

            Block::ThematicBreak => {
                self.cr();
                self.out.push_str("<hr />\n");
            }

            Block::Table {
                alignments,
                headers,
                rows,
            } => self.table(alignments, headers, rows)?,

            Block::HtmlBlock(html) => {
                self.cr();
                if self.options.unsafe_html {
                    self.raw_html(html);
                } else {
                    self.out.push_str(RAW_HTML_OMITTED);
                }
                self.cr();
            }
        }
        Ok(())
    }

    fn blocks(&mut self, blocks: &[Block], tight: bool) -> RenderResult<()> {
        for block in blocks {
            self.block(block, tight)?;
        }
        Ok(())
    }

    fn list(&mut self, ordered: bool, start: u32, tight: bool, items: &[ListItem]) -> RenderResult<()> {
        self.cr();
        if !ordered {
            self.out.push_str("<ul>\n");
        } else if start == 1 {
            self.out.push_str("<ol>\n");
        } else {
            write!(self.out, "<ol start=\"{}\">\n", start)?;
        }

        for item in items {
            self.cr();
            self.out.push_str("<li>");
            self.blocks(&item.content, tight)?;
            self.out.push_str("</li>\n");
        }

        self.out.push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
        Ok(())
    }

    fn code_block(&mut self, info: Option<&str>, code: &str) {
        self.cr();
        let language = info.and_then(|i| i.split_whitespace().next());
        match language {
            Some(lang) if self.options.github_pre_lang => {
                self.out.push_str("<pre lang=\"");
                escape_html(lang, &mut self.out);
                self.out.push_str("\"><code>");
            }
            Some(lang) => {
                self.out.push_str("<pre><code class=\"language-");
                escape_html(lang, &mut self.out);
                self.out.push_str("\">");
            }
            None => self.out.push_str("<pre><code>"),
        }
        escape_html(code, &mut self.out);
        self.out.push_str("</code></pre>\n");
    }

    fn table(
        &mut self,
        alignments: &[Alignment],
        headers: &[Vec<Inline>],
        rows: &[Vec<Vec<Inline>>],
    ) -> RenderResult<()> {
        let columns = alignments.len();
        if let Some(wide) = std::iter::once(headers)
            .chain(rows.iter().map(|r| r.as_slice()))
            .find(|row| row.len() > columns)
        {
            return Err(RenderError::MisalignedTable {
                columns,
                cells: wide.len(),
            });
        }

        self.cr();
        self.out.push_str("<table>\n<thead>\n");
        self.table_row(alignments, headers, "th")?;
        self.out.push_str("</thead>\n");

        if !rows.is_empty() {
            self.out.push_str("<tbody>\n");
            for row in rows {
                self.table_row(alignments, row, "td")?;
            }
            self.out.push_str("</tbody>\n");
        }

        self.out.push_str("</table>\n");
        Ok(())
    }

    fn table_row(&mut self, alignments: &[Alignment], cells: &[Vec<Inline>], tag: &str) -> RenderResult<()> {
        self.out.push_str("<tr>\n");
        for (i, alignment) in alignments.iter().enumerate() {
            write!(self.out, "<{}", tag)?;
            if let Some(align) = alignment.as_str() {
                if self.options.table_style_attributes {
                    write!(self.out, " style=\"text-align: {}\"", align)?;
                } else {
                    write!(self.out, " align=\"{}\"", align)?;
                }
            }
            self.out.push('>');
            if let Some(cell) = cells.get(i) {
                self.inlines(cell)?;
            }
            write!(self.out, "</{}>\n", tag)?;
        }
        self.out.push_str("</tr>\n");
        Ok(())
    }

    fn inlines(&mut self, inlines: &[Inline]) -> RenderResult<()> {
        for inline in inlines {
            self.inline(inline)?;
        }
        Ok(())
    }

    fn inline(&mut self, inline: &Inline) -> RenderResult<()> {
        match inline {
            Inline::Text(text) => escape_html(text, &mut self.out),

            Inline::SoftBreak => {
                if self.options.hard_breaks {
                    self.out.push_str("<br />\n");
                } else if self.options.no_breaks {
                    self.out.push(' ');
                } else {
                    self.out.push('\n');
                }
            }

            Inline::LineBreak => self.out.push_str("<br />\n"),

            Inline::Code(code) => {
                self.out.push_str("<code>");
                escape_html(code, &mut self.out);
                self.out.push_str("</code>");
            }

            Inline::Emphasis(content) => self.wrap("em", content)?,
            Inline::Strong(content) => self.wrap("strong", content)?,
            Inline::Strikethrough(content) => self.wrap("del", content)?,

            Inline::Link {
                content,
                url,
                title,
            } => {
                self.out.push_str("<a href=\"");
                self.url(url);
                self.out.push('"');
                self.title(title.as_deref());
                self.out.push('>');
                self.inlines(content)?;
                self.out.push_str("</a>");
            }

            Inline::Image { alt, url, title } => {
                self.out.push_str("<img src=\"");
                self.url(url);
                self.out.push_str("\" alt=\"");
                escape_html(alt, &mut self.out);
                self.out.push('"');
                self.title(title.as_deref());
                self.out.push_str(" />");
            }

            Inline::Autolink { url, text } => {
                self.out.push_str("<a href=\"");
                self.url(url);
                self.out.push_str("\">");
                escape_html(text, &mut self.out);
                self.out.push_str("</a>");
            }

            Inline::HtmlInline(html) => {
                if self.options.unsafe_html {
                    self.raw_html(html);
                } else {
                    self.out.push_str(RAW_HTML_OMITTED);
                }
            }

            Inline::TaskListMarker(checked) => {
                if *checked {
                    self.out
                        .push_str("<input type=\"checkbox\" checked=\"\" disabled=\"\" /> ");
                } else {
                    self.out.push_str("<input type=\"checkbox\" disabled=\"\" /> ");
                }
            }
        }
        Ok(())
    }

    fn wrap(&mut self, tag: &str, content: &[Inline]) -> RenderResult<()> {
        write!(self.out, "<{}>", tag)?;
        self.inlines(content)?;
        write!(self.out, "</{}>", tag)?;
        Ok(())
    }

    fn url(&mut self, url: &str) {
        if !self.options.unsafe_html && is_dangerous_url(url) {
            return;
        }
        escape_href(url, &mut self.out);
    }

    fn title(&mut self, title: Option<&str>) {
        if let Some(t) = title {
            self.out.push_str(" title=\"");
            escape_html(t, &mut self.out);
            self.out.push('"');
        }
    }

    fn raw_html(&mut self, html: &str) {
        if self.options.tag_filter {
            filter_tags(html, &mut self.out);
        } else {
            self.out.push_str(html);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Flag;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    fn html(block: &Block) -> String {
        render(block, &Options::default()).unwrap()
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(html(&Block::Document(vec![])), "");
    }

    #[test]
    fn test_paragraph() {
        let block = Block::Paragraph(vec![text("Hello World")]);
        assert_eq!(html(&block), "<p>Hello World</p>\n");
    }

    #[test]
    fn test_text_is_escaped() {
        let block = Block::Paragraph(vec![text("a <b> & \"c\"")]);
        assert_eq!(html(&block), "<p>a &lt;b&gt; &amp; &quot;c&quot;</p>\n");
    }

    #[test]
    fn test_heading() {
        let block = Block::Heading {
            level: 3,
            content: vec![text("Section")],
        };
        assert_eq!(html(&block), "<h3>Section</h3>\n");
    }

    #[test]
    fn test_heading_level_out_of_range() {
        let block = Block::Heading {
            level: 7,
            content: vec![text("Nope")],
        };
        let err = render(&block, &Options::default()).unwrap_err();
        assert!(matches!(err, RenderError::InvalidHeadingLevel(7)));
    }

    #[test]
    fn test_inline_markup() {
        let block = Block::Paragraph(vec![
            Inline::Strong(vec![text("bold")]),
            text(" "),
            Inline::Emphasis(vec![text("it")]),
            text(" "),
            Inline::Strikethrough(vec![text("gone")]),
            text(" "),
            Inline::Code("<x>".to_string()),
        ]);
        assert_eq!(
            html(&block),
            "<p><strong>bold</strong> <em>it</em> <del>gone</del> <code>&lt;x&gt;</code></p>\n"
        );
    }

    #[test]
    fn test_link_and_image() {
        let block = Block::Paragraph(vec![
            Inline::Link {
                content: vec![text("Example")],
                url: "https://example.com".to_string(),
                title: Some("T".to_string()),
            },
            Inline::Image {
                alt: "Alt \"text\"".to_string(),
                url: "image.png".to_string(),
                title: None,
            },
        ]);
        assert_eq!(
            html(&block),
            "<p><a href=\"https://example.com\" title=\"T\">Example</a><img src=\"image.png\" alt=\"Alt &quot;text&quot;\" /></p>\n"
        );
    }

    #[test]
    fn test_safe_mode_neutralises_javascript_links() {
        let block = Block::Paragraph(vec![Inline::Link {
            content: vec![text("x")],
            url: "javascript:alert(1)".to_string(),
            title: None,
        }]);
        assert_eq!(html(&block), "<p><a href=\"\">x</a></p>\n");

        let unsafe_opts = Options::from_flags(&[Flag::Unsafe]);
        let out = render(&block, &unsafe_opts).unwrap();
        assert!(out.contains("javascript:alert(1)"));
    }

    #[test]
    fn test_raw_html_policy() {
        let block = Block::Document(vec![
            Block::HtmlBlock("<div>\n<script>x</script>\n</div>\n".to_string()),
            Block::Paragraph(vec![Inline::HtmlInline("<b>".to_string())]),
        ]);
        assert_eq!(
            html(&block),
            "<!-- raw HTML omitted -->\n<p><!-- raw HTML omitted --></p>\n"
        );

        let unsafe_opts = Options::from_flags(&[Flag::Unsafe]);
        assert_eq!(
            render(&block, &unsafe_opts).unwrap(),
            "<div>\n<script>x</script>\n</div>\n<p><b></p>\n"
        );

        let filtered = unsafe_opts.with(Flag::TagFilter);
        assert_eq!(
            render(&block, &filtered).unwrap(),
            "<div>\n&lt;script>x&lt;/script>\n</div>\n<p><b></p>\n"
        );
    }

    #[test]
    fn test_code_block() {
        let block = Block::CodeBlock {
            info: Some("rust extra".to_string()),
            code: "let x = 1 < 2;\n".to_string(),
            fenced: true,
        };
        assert_eq!(
            html(&block),
            "<pre><code class=\"language-rust\">let x = 1 &lt; 2;\n</code></pre>\n"
        );

        let opts = Options::from_flags(&[Flag::GithubPreLang]);
        assert_eq!(
            render(&block, &opts).unwrap(),
            "<pre lang=\"rust\"><code>let x = 1 &lt; 2;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_blockquote() {
        let block = Block::BlockQuote(vec![Block::Paragraph(vec![text("Quote")])]);
        assert_eq!(html(&block), "<blockquote>\n<p>Quote</p>\n</blockquote>\n");
    }

    #[test]
    fn test_tight_unordered_list() {
        let block = Block::List {
            ordered: false,
            start: 1,
            tight: true,
            items: vec![
                ListItem::from_inlines(vec![text("One")]),
                ListItem::from_inlines(vec![text("Two")]),
            ],
        };
        assert_eq!(html(&block), "<ul>\n<li>One</li>\n<li>Two</li>\n</ul>\n");
    }

    #[test]
    fn test_loose_ordered_list_with_start() {
        let block = Block::List {
            ordered: true,
            start: 3,
            tight: false,
            items: vec![ListItem::from_inlines(vec![text("Three")])],
        };
        assert_eq!(
            html(&block),
            "<ol start=\"3\">\n<li>\n<p>Three</p>\n</li>\n</ol>\n"
        );
    }

    #[test]
    fn test_nested_tight_list() {
        let inner = Block::List {
            ordered: false,
            start: 1,
            tight: true,
            items: vec![ListItem::from_inlines(vec![text("b")])],
        };
        let block = Block::List {
            ordered: false,
            start: 1,
            tight: true,
            items: vec![ListItem::new(vec![Block::Paragraph(vec![text("a")]), inner])],
        };
        assert_eq!(
            html(&block),
            "<ul>\n<li>a\n<ul>\n<li>b</li>\n</ul>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_task_list_marker() {
        let block = Block::List {
            ordered: false,
            start: 1,
            tight: true,
            items: vec![
                ListItem::from_inlines(vec![Inline::TaskListMarker(true), text("done")]),
                ListItem::from_inlines(vec![Inline::TaskListMarker(false), text("todo")]),
            ],
        };
        assert_eq!(
            html(&block),
            "<ul>\n<li><input type=\"checkbox\" checked=\"\" disabled=\"\" /> done</li>\n<li><input type=\"checkbox\" disabled=\"\" /> todo</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_table() {
        let block = Block::Table {
            alignments: vec![Alignment::None, Alignment::Center],
            headers: vec![vec![text("a")], vec![text("b")]],
            rows: vec![vec![vec![text("1")], vec![text("2")]]],
        };
        assert_eq!(
            html(&block),
            "<table>\n<thead>\n<tr>\n<th>a</th>\n<th align=\"center\">b</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td>1</td>\n<td align=\"center\">2</td>\n</tr>\n</tbody>\n</table>\n"
        );

        let opts = Options::from_flags(&[Flag::TableStyleAttributes]);
        let out = render(&block, &opts).unwrap();
        assert!(out.contains("<th style=\"text-align: center\">b</th>"));
    }

    #[test]
    fn test_table_without_body_omits_tbody() {
        let block = Block::Table {
            alignments: vec![Alignment::Right],
            headers: vec![vec![text("a")]],
            rows: vec![],
        };
        let out = html(&block);
        assert!(!out.contains("<tbody>"));
        assert!(out.contains("<th align=\"right\">a</th>"));
    }

    #[test]
    fn test_misaligned_table_is_an_error() {
        let block = Block::Table {
            alignments: vec![Alignment::None],
            headers: vec![vec![text("a")], vec![text("b")]],
            rows: vec![],
        };
        let err = render(&block, &Options::default()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::MisalignedTable {
                columns: 1,
                cells: 2
            }
        ));
    }

    #[test]
    fn test_soft_break_modes() {
        let block = Block::Paragraph(vec![text("a"), Inline::SoftBreak, text("b")]);
        assert_eq!(html(&block), "<p>a\nb</p>\n");

        let hard = Options::from_flags(&[Flag::HardBreaks]);
        assert_eq!(render(&block, &hard).unwrap(), "<p>a<br />\nb</p>\n");

        let none = Options::from_flags(&[Flag::NoBreaks]);
        assert_eq!(render(&block, &none).unwrap(), "<p>a b</p>\n");
    }

    #[test]
    fn test_thematic_break() {
        assert_eq!(html(&Block::ThematicBreak), "<hr />\n");
    }
}
