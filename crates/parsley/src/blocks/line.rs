//! Column-aware cursor over one input line
//!
//! Indentation is measured in columns with tab stops every 4 columns. A tab
//! can be partially consumed, e.g. when a list item's content column falls in
//! the middle of it; the unconsumed columns come back as spaces.

use std::borrow::Cow;

pub(crate) const TAB_STOP: usize = 4;

#[derive(Debug, Clone)]
pub(crate) struct Line<'a> {
    text: &'a str,
    pub offset: usize,
    pub column: usize,
    pub partially_consumed_tab: bool,
    pub first_nonspace: usize,
    pub first_nonspace_column: usize,
    pub indent: usize,
    pub blank: bool,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    offset: usize,
    column: usize,
    partially_consumed_tab: bool,
}

impl<'a> Line<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line = Self {
            text,
            offset: 0,
            column: 0,
            partially_consumed_tab: false,
            first_nonspace: 0,
            first_nonspace_column: 0,
            indent: 0,
            blank: false,
        };
        line.find_first_nonspace();
        line
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn byte_at(&self, pos: usize) -> Option<u8> {
        self.text.as_bytes().get(pos).copied()
    }

    /// Byte at the first non-space position
    pub fn peek_nonspace(&self) -> Option<u8> {
        self.byte_at(self.first_nonspace)
    }

    /// Text from the first non-space position to the end of line
    pub fn from_nonspace(&self) -> &'a str {
        &self.text[self.first_nonspace..]
    }

    pub fn find_first_nonspace(&mut self) {
        let bytes = self.text.as_bytes();
        let mut pos = self.offset;
        let mut column = self.column;
        while let Some(&b) = bytes.get(pos) {
            match b {
                b' ' => column += 1,
                b'\t' => column += TAB_STOP - column % TAB_STOP,
                _ => break,
            }
            pos += 1;
        }
        self.first_nonspace = pos;
        self.first_nonspace_column = column;
        self.indent = column - self.column;
        self.blank = pos >= bytes.len();
    }

    /// Advance by `count` columns (`columns == true`) or bytes
    pub fn advance(&mut self, mut count: usize, columns: bool) {
        let bytes = self.text.as_bytes();
        while count > 0 && self.offset < bytes.len() {
            if bytes[self.offset] == b'\t' {
                let to_tab = TAB_STOP - self.column % TAB_STOP;
                if columns {
                    self.partially_consumed_tab = to_tab > count;
                    let step = to_tab.min(count);
                    self.column += step;
                    if !self.partially_consumed_tab {
                        self.offset += 1;
                    }
                    count -= step;
                } else {
                    self.partially_consumed_tab = false;
                    self.column += to_tab;
                    self.offset += 1;
                    count -= 1;
                }
            } else {
                self.partially_consumed_tab = false;
                self.offset += 1;
                self.column += 1;
                count -= 1;
            }
        }
    }

    /// Jump to the first non-space position
    pub fn advance_to_nonspace(&mut self) {
        let count = self.first_nonspace - self.offset;
        self.advance(count, false);
    }

    /// Skip one optional space or tab column (after `>` or a list marker)
    pub fn skip_optional_space(&mut self) {
        if matches!(self.byte_at(self.offset), Some(b' ' | b'\t')) {
            self.advance(1, true);
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            offset: self.offset,
            column: self.column,
            partially_consumed_tab: self.partially_consumed_tab,
        }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.offset = checkpoint.offset;
        self.column = checkpoint.column;
        self.partially_consumed_tab = checkpoint.partially_consumed_tab;
    }

    /// What is left of the line, with a partially consumed tab as spaces
    pub fn remainder(&self) -> Cow<'a, str> {
        if self.partially_consumed_tab {
            let spaces = TAB_STOP - self.column % TAB_STOP;
            let mut out = " ".repeat(spaces);
            out.push_str(&self.text[self.offset + 1..]);
            Cow::Owned(out)
        } else {
            Cow::Borrowed(&self.text[self.offset..])
        }
    }
}
