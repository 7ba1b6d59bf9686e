//! Inline content
//!
//! Text is scanned left to right into a doubly linked list of slots. Runs of
//! `*`, `_` and `~` go into the list as plain slots and onto a delimiter
//! stack; `[` and `![` go onto a bracket stack. A `]` either turns its bracket
//! into a link (resolving emphasis inside it first) or falls back to text.
//! Whatever emphasis is left is resolved once the end of input is reached.

pub(crate) mod autolink;
mod delimiters;
pub(crate) mod entities;
pub(crate) mod html;
pub(crate) mod links;

use std::collections::HashMap;

use parsley_core::{plain_text, Inline, Options};

use crate::refs::LinkReferences;

use delimiters::Delim;
use entities::decode_entity;
use html::{scan_autolink, scan_raw_html};
use links::{
    scan_link_destination, scan_link_label, scan_link_title, skip_spaces, skip_spaces_and_newline,
    MAX_LABEL_CHARS,
};

/// Parse the inline content of one block
pub(crate) fn parse_inlines(text: &str, refs: &LinkReferences, options: &Options) -> Vec<Inline> {
    let mut parser = InlineParser::new(text, refs, options);
    parser.parse();
    let inlines = parser.into_inlines();
    if options.autolink {
        autolink::link_bare_urls(inlines)
    } else {
        inlines
    }
}

type SlotId = usize;

/// Emphasis is not wrapped around content already nested this deep
const MAX_INLINE_NESTING: usize = 64;

#[derive(Debug)]
enum Piece {
    Inline(Inline),
    /// What is left of a delimiter run
    Run { ch: char, len: usize },
    /// `[` or `![` that has not become a link yet
    Opener(&'static str),
    Removed,
}

#[derive(Debug)]
struct Slot {
    piece: Piece,
    /// How many emphasis or link levels the piece contains
    depth: usize,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

#[derive(Debug, Clone, Copy)]
struct Bracket {
    slot: SlotId,
    image: bool,
    active: bool,
    /// Delimiters at or above this index belong to the bracket's content
    delim_bottom: usize,
    /// Byte offset just past the `[`
    text_start: usize,
}

struct InlineParser<'a> {
    input: &'a str,
    pos: usize,
    refs: &'a LinkReferences,
    options: &'a Options,
    slots: Vec<Slot>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
    delims: Vec<Delim>,
    last_delim: Option<usize>,
    brackets: Vec<Bracket>,
    /// Backtick run length → start offsets, built on first use
    backtick_runs: Option<HashMap<usize, Vec<usize>>>,
}

fn is_special(b: u8) -> bool {
    matches!(
        b,
        b'\n' | b'\\' | b'`' | b'*' | b'_' | b'~' | b'[' | b'!' | b']' | b'<' | b'&'
    )
}

impl<'a> InlineParser<'a> {
    fn new(input: &'a str, refs: &'a LinkReferences, options: &'a Options) -> Self {
        Self {
            input,
            pos: 0,
            refs,
            options,
            slots: Vec::new(),
            head: None,
            tail: None,
            delims: Vec::new(),
            last_delim: None,
            brackets: Vec::new(),
            backtick_runs: None,
        }
    }

    fn parse(&mut self) {
        let input = self.input;
        let bytes = input.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\n' => self.handle_newline(),
                b'\\' => self.handle_backslash(),
                b'`' => self.handle_backticks(),
                b @ (b'*' | b'_') => self.handle_delim(b as char),
                b'~' if self.options.strikethrough => self.handle_delim('~'),
                b'[' => {
                    self.pos += 1;
                    self.push_bracket("[", false);
                }
                b'!' if bytes.get(self.pos + 1) == Some(&b'[') => {
                    self.pos += 2;
                    self.push_bracket("![", true);
                }
                b']' => self.handle_close_bracket(),
                b'<' => self.handle_angle(),
                b'&' => self.handle_entity(),
                _ => self.handle_text(),
            }
        }
        self.process_emphasis(0);
    }

    fn append(&mut self, piece: Piece) -> SlotId {
        let id = self.slots.len();
        self.slots.push(Slot {
            piece,
            depth: 0,
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(tail) => self.slots[tail].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        id
    }

    fn append_text(&mut self, text: &str) {
        if let Some(tail) = self.tail {
            if let Piece::Inline(Inline::Text(existing)) = &mut self.slots[tail].piece {
                existing.push_str(text);
                return;
            }
        }
        self.append(Piece::Inline(Inline::Text(text.to_string())));
    }

    fn handle_text(&mut self) {
        let input = self.input;
        let bytes = input.as_bytes();
        let start = self.pos;
        let mut end = start + 1;
        while end < bytes.len() && !is_special(bytes[end]) {
            end += 1;
        }
        self.pos = end;
        self.append_text(&input[start..end]);
    }

    fn skip_line_indent(&mut self) {
        self.pos += skip_spaces(&self.input[self.pos..]);
    }

    fn handle_newline(&mut self) {
        self.pos += 1;
        let mut hard = false;
        if let Some(tail) = self.tail {
            if let Piece::Inline(Inline::Text(text)) = &mut self.slots[tail].piece {
                let kept = text.trim_end_matches(' ').len();
                hard = text.len() - kept >= 2;
                text.truncate(kept);
            }
        }
        let inline = if hard {
            Inline::LineBreak
        } else {
            Inline::SoftBreak
        };
        self.append(Piece::Inline(inline));
        self.skip_line_indent();
    }

    fn handle_backslash(&mut self) {
        let input = self.input;
        match input.as_bytes().get(self.pos + 1) {
            Some(b'\n') => {
                self.pos += 2;
                self.append(Piece::Inline(Inline::LineBreak));
                self.skip_line_indent();
            }
            Some(b) if b.is_ascii_punctuation() => {
                self.append_text(&input[self.pos + 1..self.pos + 2]);
                self.pos += 2;
            }
            _ => {
                self.append_text("\\");
                self.pos += 1;
            }
        }
    }

    fn handle_backticks(&mut self) {
        let input = self.input;
        let start = self.pos;
        let len = input[start..].bytes().take_while(|b| *b == b'`').count();
        let after = start + len;

        match self.find_closing_backticks(after, len) {
            Some(close) => {
                let code = normalize_code_span(&input[after..close]);
                self.append(Piece::Inline(Inline::Code(code)));
                self.pos = close + len;
            }
            None => {
                self.append_text(&input[start..after]);
                self.pos = after;
            }
        }
    }

    /// Start of the next backtick run of exactly `len` at or after `from`
    fn find_closing_backticks(&mut self, from: usize, len: usize) -> Option<usize> {
        let input = self.input;
        let runs = self.backtick_runs.get_or_insert_with(|| {
            let mut runs: HashMap<usize, Vec<usize>> = HashMap::new();
            let bytes = input.as_bytes();
            let mut i = 0;
            while i < bytes.len() {
                if bytes[i] == b'`' {
                    let run = bytes[i..].iter().take_while(|b| **b == b'`').count();
                    runs.entry(run).or_default().push(i);
                    i += run;
                } else {
                    i += 1;
                }
            }
            runs
        });
        let starts = runs.get(&len)?;
        let index = starts.partition_point(|start| *start < from);
        starts.get(index).copied()
    }

    fn handle_angle(&mut self) {
        let input = self.input;
        let rest = &input[self.pos..];
        if let Some((url, text, len)) = scan_autolink(rest) {
            self.append(Piece::Inline(Inline::Autolink { url, text }));
            self.pos += len;
        } else if let Some(len) = scan_raw_html(rest) {
            self.append(Piece::Inline(Inline::HtmlInline(rest[..len].to_string())));
            self.pos += len;
        } else {
            self.append_text("<");
            self.pos += 1;
        }
    }

    fn handle_entity(&mut self) {
        match decode_entity(&self.input[self.pos..]) {
            Some((decoded, len)) => {
                self.append_text(&decoded);
                self.pos += len;
            }
            None => {
                self.append_text("&");
                self.pos += 1;
            }
        }
    }

    fn push_bracket(&mut self, text: &'static str, image: bool) {
        let slot = self.append(Piece::Opener(text));
        self.brackets.push(Bracket {
            slot,
            image,
            active: true,
            delim_bottom: self.delims.len(),
            text_start: self.pos,
        });
    }

    fn handle_close_bracket(&mut self) {
        let label_end = self.pos;
        self.pos += 1;

        let Some(opener) = self.brackets.last().copied() else {
            self.append_text("]");
            return;
        };
        if !opener.active {
            self.brackets.pop();
            self.append_text("]");
            return;
        }

        match self.resolve_link(opener.text_start, label_end) {
            Some((url, title, end)) => {
                self.pos = end;
                self.make_link(opener, url, title);
            }
            None => {
                self.brackets.pop();
                self.append_text("]");
            }
        }
    }

    /// What follows `]`: an inline destination or a reference label
    fn resolve_link(
        &self,
        text_start: usize,
        label_end: usize,
    ) -> Option<(String, Option<String>, usize)> {
        let after = self.pos;
        let rest = &self.input[after..];

        if let Some(inner) = rest.strip_prefix('(') {
            if let Some((url, title, len)) = parse_inline_destination(inner) {
                return Some((url, title, after + 1 + len));
            }
        }

        if self.refs.is_empty() {
            return None;
        }
        let (label, end) = match scan_link_label(rest) {
            Some((label, len)) => (label, after + len),
            None => {
                let text = &self.input[text_start..label_end];
                if text.len() > MAX_LABEL_CHARS * 4 || text.chars().count() > MAX_LABEL_CHARS {
                    return None;
                }
                let end = if rest.starts_with("[]") { after + 2 } else { after };
                (text, end)
            }
        };
        let reference = self.refs.get(label)?;
        Some((reference.url.clone(), reference.title.clone(), end))
    }

    fn make_link(&mut self, opener: Bracket, url: String, title: Option<String>) {
        self.process_emphasis(opener.delim_bottom);
        let (content, depth) = self.take_after(opener.slot);
        let inline = if opener.image {
            Inline::Image {
                alt: plain_text(&content),
                url,
                title,
            }
        } else {
            Inline::Link {
                content,
                url,
                title,
            }
        };
        let slot = &mut self.slots[opener.slot];
        slot.piece = Piece::Inline(inline);
        slot.depth = if opener.image { 0 } else { depth + 1 };
        self.brackets.pop();

        if !opener.image {
            for bracket in self.brackets.iter_mut().filter(|b| !b.image) {
                bracket.active = false;
            }
        }
    }

    /// Detach every slot after `slot` and return their inlines with the
    /// deepest nesting among them
    fn take_after(&mut self, slot: SlotId) -> (Vec<Inline>, usize) {
        let mut pieces = Vec::new();
        let mut depth = 0;
        let mut cur = self.slots[slot].next;
        while let Some(id) = cur {
            cur = self.slots[id].next;
            depth = depth.max(self.slots[id].depth);
            pieces.push(std::mem::replace(&mut self.slots[id].piece, Piece::Removed));
        }
        self.slots[slot].next = None;
        self.tail = Some(slot);
        (collect_inlines(pieces), depth)
    }

    /// Detach the slots strictly between `from` and `to`
    fn take_between(&mut self, from: SlotId, to: SlotId) -> (Vec<Inline>, usize) {
        let mut pieces = Vec::new();
        let mut depth = 0;
        let mut cur = self.slots[from].next;
        while let Some(id) = cur {
            if id == to {
                break;
            }
            cur = self.slots[id].next;
            depth = depth.max(self.slots[id].depth);
            pieces.push(std::mem::replace(&mut self.slots[id].piece, Piece::Removed));
        }
        self.slots[from].next = Some(to);
        self.slots[to].prev = Some(from);
        (collect_inlines(pieces), depth)
    }

    /// Deepest nesting among the slots strictly between `from` and `to`
    fn depth_between(&self, from: SlotId, to: SlotId) -> usize {
        let mut depth = 0;
        let mut cur = self.slots[from].next;
        while let Some(id) = cur {
            if id == to {
                break;
            }
            depth = depth.max(self.slots[id].depth);
            cur = self.slots[id].next;
        }
        depth
    }

    fn insert_after(&mut self, slot: SlotId, piece: Piece, depth: usize) -> SlotId {
        let id = self.slots.len();
        let next = self.slots[slot].next;
        self.slots.push(Slot {
            piece,
            depth,
            prev: Some(slot),
            next,
        });
        self.slots[slot].next = Some(id);
        match next {
            Some(next) => self.slots[next].prev = Some(id),
            None => self.tail = Some(id),
        }
        id
    }

    fn unlink(&mut self, slot: SlotId) {
        let Slot { prev, next, .. } = self.slots[slot];
        match prev {
            Some(prev) => self.slots[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.slots[next].prev = prev,
            None => self.tail = prev,
        }
        self.slots[slot].piece = Piece::Removed;
    }

    fn into_inlines(mut self) -> Vec<Inline> {
        let mut pieces = Vec::new();
        let mut cur = self.head;
        while let Some(id) = cur {
            cur = self.slots[id].next;
            pieces.push(std::mem::replace(&mut self.slots[id].piece, Piece::Removed));
        }
        collect_inlines(pieces)
    }
}

/// Turn leftover pieces into inlines, merging adjacent text
fn collect_inlines(pieces: Vec<Piece>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        let inline = match piece {
            Piece::Inline(inline) => inline,
            Piece::Run { ch, len } => Inline::Text(ch.to_string().repeat(len)),
            Piece::Opener(text) => Inline::Text(text.to_string()),
            Piece::Removed => continue,
        };
        if let Inline::Text(text) = &inline {
            if text.is_empty() {
                continue;
            }
            if let Some(Inline::Text(last)) = out.last_mut() {
                last.push_str(text);
                continue;
            }
        }
        out.push(inline);
    }
    out
}

/// `(destination "title")` after a link's `]`, without the `(`
fn parse_inline_destination(s: &str) -> Option<(String, Option<String>, usize)> {
    let mut pos = skip_spaces_and_newline(s);
    let url = if s[pos..].starts_with(')') {
        String::new()
    } else {
        let (url, len) = scan_link_destination(&s[pos..])?;
        pos += len;
        url
    };

    let ws = skip_spaces_and_newline(&s[pos..]);
    let mut title = None;
    if ws > 0 {
        pos += ws;
        if let Some((text, len)) = scan_link_title(&s[pos..]) {
            title = Some(text);
            pos += len;
            pos += skip_spaces_and_newline(&s[pos..]);
        }
    }

    if s[pos..].starts_with(')') {
        Some((url, title, pos + 1))
    } else {
        None
    }
}

fn normalize_code_span(raw: &str) -> String {
    let code = raw.replace('\n', " ");
    if code.len() >= 2 && code.starts_with(' ') && code.ends_with(' ') && !code.bytes().all(|b| b == b' ')
    {
        code[1..code.len() - 1].to_string()
    } else {
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refs::LinkReference;
    use parsley_core::Flag;

    fn parse(text: &str) -> Vec<Inline> {
        parse_inlines(text, &LinkReferences::new(), &Options::default())
    }

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    fn em(children: Vec<Inline>) -> Inline {
        Inline::Emphasis(children)
    }

    fn strong(children: Vec<Inline>) -> Inline {
        Inline::Strong(children)
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(parse("hello world"), vec![text("hello world")]);
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_emphasis_and_strong() {
        assert_eq!(parse("*a*"), vec![em(vec![text("a")])]);
        assert_eq!(parse("__b__"), vec![strong(vec![text("b")])]);
        assert_eq!(
            parse("***both***"),
            vec![em(vec![strong(vec![text("both")])])]
        );
    }

    #[test]
    fn test_emphasis_ambiguity() {
        assert_eq!(
            parse("*a*b*c*"),
            vec![em(vec![text("a")]), text("b"), em(vec![text("c")])]
        );
    }

    #[test]
    fn test_unterminated_strong_is_literal() {
        assert_eq!(parse("**unterminated"), vec![text("**unterminated")]);
    }

    #[test]
    fn test_intraword_underscore() {
        assert_eq!(parse("snake_case_words"), vec![text("snake_case_words")]);
        assert_eq!(
            parse("intra*word*s"),
            vec![text("intra"), em(vec![text("word")]), text("s")]
        );
    }

    #[test]
    fn test_rule_of_three() {
        assert_eq!(
            parse("*foo**bar**baz*"),
            vec![em(vec![
                text("foo"),
                strong(vec![text("bar")]),
                text("baz")
            ])]
        );
        assert_eq!(
            parse("**foo*"),
            vec![text("*"), em(vec![text("foo")])]
        );
    }

    #[test]
    fn test_strikethrough() {
        let options = Options::from_flags(&[Flag::Strikethrough]);
        let refs = LinkReferences::new();
        assert_eq!(
            parse_inlines("~~gone~~ ~one~", &refs, &options),
            vec![
                Inline::Strikethrough(vec![text("gone")]),
                text(" "),
                Inline::Strikethrough(vec![text("one")]),
            ]
        );
        assert_eq!(
            parse_inlines("~~mismatch~", &refs, &options),
            vec![text("~~mismatch~")]
        );
        assert_eq!(
            parse_inlines("~~~three~~~", &refs, &options),
            vec![text("~~~three~~~")]
        );
        assert_eq!(parse("~~off~~"), vec![text("~~off~~")]);
    }

    #[test]
    fn test_code_spans() {
        assert_eq!(parse("`code`"), vec![Inline::Code("code".to_string())]);
        assert_eq!(parse("`` a`b ``"), vec![Inline::Code("a`b".to_string())]);
        assert_eq!(parse("` `"), vec![Inline::Code(" ".to_string())]);
        assert_eq!(parse("`*no*`"), vec![Inline::Code("*no*".to_string())]);
        assert_eq!(parse("`a\nb`"), vec![Inline::Code("a b".to_string())]);
        assert_eq!(parse("``open`"), vec![text("``open`")]);
    }

    #[test]
    fn test_backslash_escapes() {
        assert_eq!(parse(r"\*not\*"), vec![text("*not*")]);
        assert_eq!(parse(r"\a"), vec![text(r"\a")]);
        assert_eq!(
            parse("a\\\nb"),
            vec![text("a"), Inline::LineBreak, text("b")]
        );
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(
            parse("a  \nb"),
            vec![text("a"), Inline::LineBreak, text("b")]
        );
        assert_eq!(
            parse("a \nb"),
            vec![text("a"), Inline::SoftBreak, text("b")]
        );
    }

    #[test]
    fn test_entities() {
        assert_eq!(parse("&amp; &copy; &#35; &bogus;"), vec![text("& © # &bogus;")]);
    }

    #[test]
    fn test_inline_link() {
        assert_eq!(
            parse("[link](/url \"title\")"),
            vec![Inline::Link {
                content: vec![text("link")],
                url: "/url".to_string(),
                title: Some("title".to_string()),
            }]
        );
        assert_eq!(
            parse("[empty]()"),
            vec![Inline::Link {
                content: vec![text("empty")],
                url: String::new(),
                title: None,
            }]
        );
    }

    #[test]
    fn test_link_with_emphasis() {
        assert_eq!(
            parse("[*a*](/u)"),
            vec![Inline::Link {
                content: vec![em(vec![text("a")])],
                url: "/u".to_string(),
                title: None,
            }]
        );
    }

    #[test]
    fn test_emphasis_does_not_cross_link_boundary() {
        assert_eq!(
            parse("*[a*](/u)"),
            vec![
                text("*"),
                Inline::Link {
                    content: vec![text("a*")],
                    url: "/u".to_string(),
                    title: None,
                }
            ]
        );
    }

    #[test]
    fn test_links_do_not_nest() {
        assert_eq!(
            parse("[a [b](/inner)](/outer)"),
            vec![
                text("[a "),
                Inline::Link {
                    content: vec![text("b")],
                    url: "/inner".to_string(),
                    title: None,
                },
                text("](/outer)"),
            ]
        );
    }

    #[test]
    fn test_image() {
        assert_eq!(
            parse("![alt *text*](/img.png)"),
            vec![Inline::Image {
                alt: "alt text".to_string(),
                url: "/img.png".to_string(),
                title: None,
            }]
        );
    }

    #[test]
    fn test_reference_links() {
        let mut refs = LinkReferences::new();
        refs.insert(
            "Foo Bar",
            LinkReference {
                url: "/url".to_string(),
                title: None,
            },
        );
        let options = Options::default();
        let link = |content: &str| Inline::Link {
            content: vec![text(content)],
            url: "/url".to_string(),
            title: None,
        };

        assert_eq!(parse_inlines("[x][foo bar]", &refs, &options), vec![link("x")]);
        assert_eq!(parse_inlines("[foo  BAR][]", &refs, &options), vec![link("foo  BAR")]);
        assert_eq!(parse_inlines("[Foo Bar]", &refs, &options), vec![link("Foo Bar")]);
        assert_eq!(
            parse_inlines("[x][missing]", &refs, &options),
            vec![text("[x][missing]")]
        );
        assert_eq!(parse_inlines("[missing]", &refs, &options), vec![text("[missing]")]);
    }

    #[test]
    fn test_autolinks_and_html() {
        assert_eq!(
            parse("<https://a.b>"),
            vec![Inline::Autolink {
                url: "https://a.b".to_string(),
                text: "https://a.b".to_string(),
            }]
        );
        assert_eq!(
            parse("a <b>c</b>"),
            vec![
                text("a "),
                Inline::HtmlInline("<b>".to_string()),
                text("c"),
                Inline::HtmlInline("</b>".to_string()),
            ]
        );
        assert_eq!(parse("a < b"), vec![text("a < b")]);
    }

    #[test]
    fn test_unmatched_brackets() {
        assert_eq!(parse("[a] ]b ![c"), vec![text("[a] ]b ![c")]);
    }

    #[test]
    fn test_many_openers_terminate() {
        let input = "*a ".repeat(5000);
        let inlines = parse(&input);
        assert_eq!(plain_text(&inlines), input);
    }

    #[test]
    fn test_deep_emphasis_is_capped() {
        let stars = "*".repeat(100_000);
        let inlines = parse(&format!("{}a{}", stars, stars));
        assert_eq!(inlines.len(), 3);

        let mut depth = 0;
        let mut current = &inlines[1];
        while let Inline::Strong(children) = current {
            depth += 1;
            current = &children[0];
        }
        assert_eq!(depth, MAX_INLINE_NESTING);
        assert_eq!(current, &text("a"));

        let leftover = "*".repeat(100_000 - 2 * MAX_INLINE_NESTING);
        assert_eq!(inlines[0], text(&leftover));
        assert_eq!(inlines[2], text(&leftover));
    }

    #[test]
    fn test_normalize_code_span() {
        assert_eq!(normalize_code_span(" a "), "a");
        assert_eq!(normalize_code_span("  "), "  ");
        assert_eq!(normalize_code_span(" a"), " a");
    }
}
