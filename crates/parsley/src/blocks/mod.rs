//! Block structure
//!
//! Lines are fed one at a time. Each line first walks the chain of open
//! containers (block quotes, list items, code and HTML blocks) consuming their
//! prefixes, then tries to open new blocks, and whatever text remains lands in
//! the deepest block that accepts lines. Blocks live in an arena while open;
//! once the input is exhausted the arena is turned into an owned `Block` tree
//! and every leaf's text goes through the inline parser.

mod line;
mod scanners;
mod table;

use parsley_core::{Alignment, Block, Inline, ListItem, Options};

use crate::inlines::entities::unescape;
use crate::inlines::parse_inlines;
use crate::refs::{extract_definitions, LinkReferences};

use line::Line;
use scanners::{
    atx_content, atx_heading, close_fence, html_block_end, html_block_start, list_marker,
    open_fence, setext_underline, thematic_break, ListMarker,
};

type NodeId = usize;

const ROOT: NodeId = 0;

/// Block quotes, lists and items nested deeper than this are not opened;
/// their markers stay paragraph text
const MAX_CONTAINER_DEPTH: usize = 64;

#[derive(Debug)]
struct Fence {
    marker: u8,
    len: usize,
    indent: usize,
}

#[derive(Debug)]
struct ItemData {
    marker_offset: usize,
    padding: usize,
}

#[derive(Debug)]
struct TableData {
    alignments: Vec<Alignment>,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

#[derive(Debug)]
enum Kind {
    Document,
    BlockQuote,
    List { marker: ListMarker, tight: bool },
    Item(ItemData),
    Paragraph,
    Heading { level: u8, setext: bool },
    ThematicBreak,
    CodeBlock { fence: Option<Fence>, info: String },
    HtmlBlock(u8),
    Table(TableData),
}

impl Kind {
    fn can_contain(&self, child: &Kind) -> bool {
        match self {
            Kind::Document | Kind::BlockQuote | Kind::Item(_) => !matches!(child, Kind::Item(_)),
            Kind::List { .. } => matches!(child, Kind::Item(_)),
            _ => false,
        }
    }

    fn accepts_lines(&self) -> bool {
        matches!(
            self,
            Kind::Paragraph | Kind::Heading { .. } | Kind::CodeBlock { .. } | Kind::HtmlBlock(_)
        )
    }
}

#[derive(Debug)]
struct Node {
    kind: Kind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    content: String,
    open: bool,
    last_line_blank: bool,
    start_line: usize,
    depth: usize,
}

/// Parse a Markdown body into a document tree
pub(crate) fn parse_blocks(text: &str, options: &Options) -> Block {
    let mut parser = BlockParser::new(options);
    if text.contains('\0') {
        parser.feed(&text.replace('\0', "\u{fffd}"));
    } else {
        parser.feed(text);
    }
    parser.finish()
}

struct BlockParser<'o> {
    options: &'o Options,
    nodes: Vec<Node>,
    tip: NodeId,
    refs: LinkReferences,
    line_number: usize,
}

impl<'o> BlockParser<'o> {
    fn new(options: &'o Options) -> Self {
        let root = Node {
            kind: Kind::Document,
            parent: None,
            children: Vec::new(),
            content: String::new(),
            open: true,
            last_line_blank: false,
            start_line: 1,
            depth: 0,
        };
        Self {
            options,
            nodes: vec![root],
            tip: ROOT,
            refs: LinkReferences::new(),
            line_number: 0,
        }
    }

    fn feed(&mut self, text: &str) {
        let bytes = text.as_bytes();
        let mut start = 0;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    self.process_line(&text[start..i]);
                    start = i + 1;
                }
                b'\r' => {
                    self.process_line(&text[start..i]);
                    if bytes.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    start = i + 1;
                }
                _ => {}
            }
            i += 1;
        }
        if start < bytes.len() {
            self.process_line(&text[start..]);
        }
    }

    fn finish(mut self) -> Block {
        while self.tip != ROOT {
            self.tip = self.finalize(self.tip);
        }
        self.finalize(ROOT);

        log::trace!(
            "Parsed {} blocks with {} link reference definitions",
            self.nodes.len() - 1,
            self.refs.len()
        );

        Builder {
            nodes: &self.nodes,
            refs: &self.refs,
            options: self.options,
        }
        .document()
    }

    fn process_line(&mut self, text: &str) {
        self.line_number += 1;
        let mut line = Line::new(text);

        let Some(last_matched) = self.match_containers(&mut line) else {
            return;
        };
        let mut unmatched_closed = self.tip == last_matched;
        let mut container = last_matched;
        let mut opened_fence = false;
        let mut maybe_lazy = matches!(self.nodes[self.tip].kind, Kind::Paragraph | Kind::Table(_));

        loop {
            if matches!(
                self.nodes[container].kind,
                Kind::CodeBlock { .. } | Kind::HtmlBlock(_)
            ) {
                break;
            }
            line.find_first_nonspace();
            let indented = line.indent >= 4;
            let rest = line.from_nonspace();
            let in_paragraph = matches!(self.nodes[container].kind, Kind::Paragraph);
            let nestable = self.nodes[container].depth < MAX_CONTAINER_DEPTH;

            let kind = if nestable && !indented && line.peek_nonspace() == Some(b'>') {
                line.advance_to_nonspace();
                line.advance(1, false);
                line.skip_optional_space();
                Kind::BlockQuote
            } else if let Some((level, len)) = atx_heading(rest).filter(|_| !indented) {
                line.advance_to_nonspace();
                line.advance(len, false);
                Kind::Heading {
                    level,
                    setext: false,
                }
            } else if let Some((marker, len, info)) = open_fence(rest).filter(|_| !indented) {
                let fence = Fence {
                    marker,
                    len,
                    indent: line.indent,
                };
                let info = unescape(info).into_owned();
                line.advance(line.text().len() - line.offset, false);
                opened_fence = true;
                Kind::CodeBlock {
                    fence: Some(fence),
                    info,
                }
            } else if let Some(kind) = html_block_start(rest, in_paragraph).filter(|_| !indented) {
                Kind::HtmlBlock(kind)
            } else if !indented && in_paragraph && self.try_setext(container, rest) {
                line.advance(line.text().len() - line.offset, false);
                break;
            } else if !indented && in_paragraph && self.try_table(container, rest) {
                container = self.tip;
                line.advance(line.text().len() - line.offset, false);
                break;
            } else if !indented && thematic_break(rest) {
                line.advance(line.text().len() - line.offset, false);
                Kind::ThematicBreak
            } else if let Some(marker) =
                list_marker(rest, in_paragraph).filter(|_| nestable && !indented)
            {
                let marker_offset = line.indent;
                line.advance_to_nonspace();
                line.advance(marker.width, false);

                let saved = line.checkpoint();
                let start_column = line.column;
                while line.column - start_column <= 5
                    && matches!(line.byte_at(line.offset), Some(b' ' | b'\t'))
                {
                    line.advance(1, true);
                }
                let spaces = line.column - start_column;
                let padding = if spaces >= 5 || spaces < 1 || line.byte_at(line.offset).is_none() {
                    line.restore(saved);
                    if spaces > 0 {
                        line.advance(1, true);
                    }
                    marker.width + 1
                } else {
                    marker.width + spaces
                };

                if !unmatched_closed {
                    self.close_unmatched(last_matched);
                    unmatched_closed = true;
                }
                let continues = match &self.nodes[container].kind {
                    Kind::List { marker: first, .. } => marker.same_list(first),
                    _ => false,
                };
                if !continues {
                    container = self.add_child(
                        container,
                        Kind::List {
                            marker,
                            tight: true,
                        },
                    );
                }
                container = self.add_child(
                    container,
                    Kind::Item(ItemData {
                        marker_offset,
                        padding,
                    }),
                );
                maybe_lazy = false;
                continue;
            } else if indented && !maybe_lazy && !line.blank {
                line.advance(4, true);
                Kind::CodeBlock {
                    fence: None,
                    info: String::new(),
                }
            } else {
                break;
            };

            if !unmatched_closed {
                self.close_unmatched(last_matched);
                unmatched_closed = true;
            }
            let accepts_lines = kind.accepts_lines();
            container = self.add_child(container, kind);
            if accepts_lines {
                break;
            }
            maybe_lazy = false;
        }

        self.add_text(&mut line, container, last_matched, unmatched_closed, opened_fence);
    }

    /// Walk the open containers, consuming the prefix each one requires, and
    /// return the deepest one that matched
    ///
    /// `None` means the line was fully handled (a closing code fence).
    fn match_containers(&mut self, line: &mut Line<'_>) -> Option<NodeId> {
        let mut container = ROOT;
        loop {
            let Some(&child) = self.nodes[container].children.last() else {
                return Some(container);
            };
            if !self.nodes[child].open {
                return Some(container);
            }
            line.find_first_nonspace();

            let node = &self.nodes[child];
            let mut closes_fence = false;
            let matched = match &node.kind {
                Kind::Document | Kind::List { .. } => true,
                Kind::BlockQuote => {
                    if line.indent <= 3 && line.peek_nonspace() == Some(b'>') {
                        line.advance_to_nonspace();
                        line.advance(1, false);
                        line.skip_optional_space();
                        true
                    } else {
                        false
                    }
                }
                Kind::Item(item) => {
                    let required = item.marker_offset + item.padding;
                    if line.indent >= required {
                        line.advance(required, true);
                        true
                    } else if line.blank && !node.children.is_empty() {
                        line.advance_to_nonspace();
                        true
                    } else {
                        false
                    }
                }
                Kind::CodeBlock { fence: None, .. } => {
                    if line.indent >= 4 {
                        line.advance(4, true);
                        true
                    } else if line.blank {
                        line.advance_to_nonspace();
                        true
                    } else {
                        false
                    }
                }
                Kind::CodeBlock {
                    fence: Some(fence), ..
                } => {
                    if line.indent <= 3 && close_fence(line.from_nonspace(), fence.marker, fence.len) {
                        closes_fence = true;
                    } else {
                        let mut strip = fence.indent;
                        while strip > 0 && matches!(line.byte_at(line.offset), Some(b' ' | b'\t')) {
                            line.advance(1, true);
                            strip -= 1;
                        }
                    }
                    true
                }
                Kind::HtmlBlock(kind) => !(line.blank && *kind >= 6),
                Kind::Paragraph | Kind::Table(_) => !line.blank,
                Kind::Heading { .. } | Kind::ThematicBreak => false,
            };

            if closes_fence {
                self.tip = self.finalize(child);
                return None;
            }
            if !matched {
                return Some(container);
            }
            container = child;
        }
    }

    /// Turn the open paragraph into a setext heading
    fn try_setext(&mut self, paragraph: NodeId, rest: &str) -> bool {
        let Some(level) = setext_underline(rest) else {
            return false;
        };
        self.strip_definitions(paragraph);
        if self.nodes[paragraph].content.trim().is_empty() {
            return false;
        }
        self.nodes[paragraph].kind = Kind::Heading {
            level,
            setext: true,
        };
        true
    }

    /// Start a table whose header is the last line of the open paragraph
    fn try_table(&mut self, paragraph: NodeId, rest: &str) -> bool {
        if !self.options.tables {
            return false;
        }
        let Some(alignments) = table::delimiter_row(rest) else {
            return false;
        };
        self.strip_definitions(paragraph);

        let content = self.nodes[paragraph].content.trim_end_matches('\n');
        let (before, header_line) = match content.rfind('\n') {
            Some(i) => (&content[..i], &content[i + 1..]),
            None => ("", content),
        };
        if !header_line.contains('|') && !rest.contains('|') {
            return false;
        }
        let header = table::split_row(header_line);
        if header.len() != alignments.len() || header_line.trim().is_empty() {
            return false;
        }

        let data = TableData {
            alignments,
            header,
            rows: Vec::new(),
        };
        if before.is_empty() {
            let node = &mut self.nodes[paragraph];
            node.kind = Kind::Table(data);
            node.content.clear();
            self.tip = paragraph;
        } else {
            let before = format!("{}\n", before);
            self.nodes[paragraph].content = before;
            let parent = self.finalize(paragraph);
            self.tip = parent;
            self.add_child(parent, Kind::Table(data));
        }
        true
    }

    fn add_text(
        &mut self,
        line: &mut Line<'_>,
        container: NodeId,
        last_matched: NodeId,
        unmatched_closed: bool,
        opened_fence: bool,
    ) {
        line.find_first_nonspace();

        if line.blank {
            if let Some(&last) = self.nodes[container].children.last() {
                self.nodes[last].last_line_blank = true;
            }
        }
        let node = &self.nodes[container];
        let last_line_blank = line.blank
            && match &node.kind {
                Kind::BlockQuote | Kind::Heading { .. } | Kind::ThematicBreak | Kind::Table(_) => {
                    false
                }
                Kind::CodeBlock { fence, .. } => fence.is_none(),
                Kind::Item(_) => {
                    !(node.children.is_empty() && node.start_line == self.line_number)
                }
                _ => true,
            };
        self.nodes[container].last_line_blank = last_line_blank;
        let mut ancestor = self.nodes[container].parent;
        while let Some(id) = ancestor {
            self.nodes[id].last_line_blank = false;
            ancestor = self.nodes[id].parent;
        }

        let tip = self.tip;
        if tip != last_matched
            && container == last_matched
            && !line.blank
            && matches!(self.nodes[tip].kind, Kind::Paragraph)
        {
            line.advance_to_nonspace();
            self.push_line(tip, line);
            return;
        }

        if !unmatched_closed {
            self.close_unmatched(last_matched);
        }

        let mut container = container;
        match &self.nodes[container].kind {
            Kind::CodeBlock { .. } => {
                if !opened_fence {
                    self.push_line(container, line);
                }
            }
            Kind::HtmlBlock(kind) => {
                let kind = *kind;
                self.push_line(container, line);
                if html_block_end(kind, line.from_nonspace()) {
                    container = self.finalize(container);
                }
            }
            Kind::Heading { setext: false, .. } => {
                let content = atx_content(&line.remainder()).to_string();
                self.nodes[container].content = content;
            }
            _ if line.blank => {}
            Kind::Table(_) => {
                if let Kind::Table(data) = &mut self.nodes[container].kind {
                    let columns = data.alignments.len();
                    data.rows
                        .push(table::fit_row(table::split_row(&line.remainder()), columns));
                }
            }
            Kind::Paragraph => {
                line.advance_to_nonspace();
                self.push_line(container, line);
            }
            _ => {
                line.advance_to_nonspace();
                container = self.add_child(container, Kind::Paragraph);
                self.push_line(container, line);
            }
        }
        self.tip = container;
    }

    fn push_line(&mut self, id: NodeId, line: &Line<'_>) {
        let content = &mut self.nodes[id].content;
        content.push_str(&line.remainder());
        content.push('\n');
    }

    fn add_child(&mut self, parent: NodeId, kind: Kind) -> NodeId {
        let mut parent = parent;
        while !self.nodes[parent].kind.can_contain(&kind) {
            parent = self.finalize(parent);
        }
        let id = self.nodes.len();
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            content: String::new(),
            open: true,
            last_line_blank: false,
            start_line: self.line_number,
            depth,
        });
        self.nodes[parent].children.push(id);
        self.tip = id;
        id
    }

    fn close_unmatched(&mut self, last_matched: NodeId) {
        while self.tip != last_matched {
            self.tip = self.finalize(self.tip);
        }
    }

    fn strip_definitions(&mut self, id: NodeId) {
        let node = &mut self.nodes[id];
        let consumed = extract_definitions(&node.content, &mut self.refs);
        if consumed > 0 {
            node.content.drain(..consumed);
        }
    }

    /// Close a block and return its parent
    fn finalize(&mut self, id: NodeId) -> NodeId {
        self.nodes[id].open = false;
        match &self.nodes[id].kind {
            Kind::Paragraph => {
                self.strip_definitions(id);
                let content = &mut self.nodes[id].content;
                let trimmed = content.trim_end().len();
                content.truncate(trimmed);
            }
            Kind::CodeBlock { fence: None, .. } => {
                trim_trailing_blank_lines(&mut self.nodes[id].content);
            }
            Kind::List { .. } => {
                let tight = self.list_is_tight(id);
                if let Kind::List { tight: t, .. } = &mut self.nodes[id].kind {
                    *t = tight;
                }
            }
            _ => {}
        }
        self.nodes[id].parent.unwrap_or(ROOT)
    }

    fn list_is_tight(&self, list: NodeId) -> bool {
        let items = &self.nodes[list].children;
        for (i, &item) in items.iter().enumerate() {
            let last_item = i + 1 == items.len();
            if !last_item && self.ends_with_blank_line(item) {
                return false;
            }
            let children = &self.nodes[item].children;
            for (j, &child) in children.iter().enumerate() {
                let last_child = j + 1 == children.len();
                if (!last_item || !last_child) && self.ends_with_blank_line(child) {
                    return false;
                }
            }
        }
        true
    }

    fn ends_with_blank_line(&self, id: NodeId) -> bool {
        let mut id = id;
        loop {
            let node = &self.nodes[id];
            if node.last_line_blank {
                return true;
            }
            match node.kind {
                Kind::List { .. } | Kind::Item(_) => match node.children.last() {
                    Some(&last) => id = last,
                    None => return false,
                },
                _ => return false,
            }
        }
    }
}

fn trim_trailing_blank_lines(content: &mut String) {
    while content.ends_with('\n') {
        let body = &content[..content.len() - 1];
        let start = body.rfind('\n').map_or(0, |i| i + 1);
        if body.is_empty() || !body[start..].bytes().all(|b| b == b' ' || b == b'\t') {
            break;
        }
        content.truncate(start);
    }
}

/// Converts the closed arena into owned blocks, parsing inline content
struct Builder<'a> {
    nodes: &'a [Node],
    refs: &'a LinkReferences,
    options: &'a Options,
}

impl Builder<'_> {
    fn document(&self) -> Block {
        Block::Document(self.blocks(ROOT))
    }

    fn blocks(&self, parent: NodeId) -> Vec<Block> {
        self.nodes[parent]
            .children
            .iter()
            .filter_map(|&id| self.block(id))
            .collect()
    }

    fn inlines(&self, text: &str) -> Vec<Inline> {
        parse_inlines(text, self.refs, self.options)
    }

    fn block(&self, id: NodeId) -> Option<Block> {
        let node = &self.nodes[id];
        let block = match &node.kind {
            Kind::Document => Block::Document(self.blocks(id)),
            Kind::BlockQuote => Block::BlockQuote(self.blocks(id)),
            Kind::List { marker, tight } => Block::List {
                ordered: marker.ordered,
                start: marker.start,
                tight: *tight,
                items: node.children.iter().map(|&item| self.item(item)).collect(),
            },
            Kind::Item(_) => return None,
            Kind::Paragraph => {
                if node.content.is_empty() {
                    return None;
                }
                Block::Paragraph(self.inlines(&node.content))
            }
            Kind::Heading { level, .. } => Block::Heading {
                level: *level,
                content: self.inlines(node.content.trim()),
            },
            Kind::ThematicBreak => Block::ThematicBreak,
            Kind::CodeBlock { fence, info } => Block::CodeBlock {
                info: (!info.is_empty()).then(|| info.clone()),
                code: node.content.clone(),
                fenced: fence.is_some(),
            },
            Kind::HtmlBlock(_) => Block::HtmlBlock(node.content.clone()),
            Kind::Table(data) => Block::Table {
                alignments: data.alignments.clone(),
                headers: data.header.iter().map(|cell| self.inlines(cell)).collect(),
                rows: data
                    .rows
                    .iter()
                    .map(|row| row.iter().map(|cell| self.inlines(cell)).collect())
                    .collect(),
            },
        };
        Some(block)
    }

    fn item(&self, id: NodeId) -> ListItem {
        let children = &self.nodes[id].children;
        let task = match children.first() {
            Some(&first) if self.options.tasklist => match self.nodes[first].kind {
                Kind::Paragraph => task_marker(&self.nodes[first].content),
                _ => None,
            },
            _ => None,
        };

        let Some((checked, rest)) = task else {
            return ListItem::new(self.blocks(id));
        };

        let mut content = Vec::with_capacity(children.len());
        let mut paragraph = vec![Inline::TaskListMarker(checked)];
        paragraph.extend(self.inlines(rest));
        content.push(Block::Paragraph(paragraph));
        content.extend(children[1..].iter().filter_map(|&child| self.block(child)));
        ListItem::new(content)
    }
}

/// `[ ]`, `[x]` or `[X]` followed by whitespace: the state and the rest
fn task_marker(content: &str) -> Option<(bool, &str)> {
    let bytes = content.as_bytes();
    if bytes.len() < 4 || bytes[0] != b'[' || bytes[2] != b']' {
        return None;
    }
    let checked = match bytes[1] {
        b' ' => false,
        b'x' | b'X' => true,
        _ => return None,
    };
    if !matches!(bytes[3], b' ' | b'\t' | b'\n') {
        return None;
    }
    Some((checked, content[4..].trim_start_matches(|c| c == ' ' || c == '\t')))
}
