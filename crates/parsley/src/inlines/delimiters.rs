//! Emphasis, strong emphasis and strikethrough
//!
//! Delimiter runs are matched closer-first: each potential closer looks back
//! for the nearest compatible opener. `openers_bottom` remembers, per run
//! shape, how far back a previous search already failed so that unmatched
//! openers are never rescanned.

use parsley_core::Inline;

use super::{InlineParser, Piece, SlotId, MAX_INLINE_NESTING};

#[derive(Debug, Clone, Copy)]
pub(super) struct Delim {
    slot: SlotId,
    ch: char,
    /// Length of the run as written, before any of it was matched
    orig_len: usize,
    can_open: bool,
    can_close: bool,
    prev: Option<usize>,
    next: Option<usize>,
}

fn is_punctuation(c: char) -> bool {
    if c.is_ascii() {
        c.is_ascii_punctuation()
    } else {
        !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control()
    }
}

/// Left- and right-flanking rules, returning `(can_open, can_close)`
fn flanking(ch: char, before: char, after: char) -> (bool, bool) {
    let before_space = before.is_whitespace();
    let after_space = after.is_whitespace();
    let before_punct = is_punctuation(before);
    let after_punct = is_punctuation(after);

    let left = !after_space && (!after_punct || before_space || before_punct);
    let right = !before_space && (!before_punct || after_space || after_punct);

    if ch == '_' {
        (left && (!right || before_punct), right && (!left || after_punct))
    } else {
        (left, right)
    }
}

fn char_index(ch: char) -> usize {
    match ch {
        '*' => 0,
        '_' => 1,
        _ => 2,
    }
}

impl InlineParser<'_> {
    pub(super) fn handle_delim(&mut self, ch: char) {
        let input = self.input;
        let start = self.pos;
        let len = input[start..].bytes().take_while(|b| *b == ch as u8).count();
        self.pos += len;

        if ch == '~' && len > 2 {
            self.append_text(&input[start..self.pos]);
            return;
        }

        let before = input[..start].chars().next_back().unwrap_or('\n');
        let after = input[self.pos..].chars().next().unwrap_or('\n');
        let (can_open, can_close) = flanking(ch, before, after);

        let slot = self.append(Piece::Run { ch, len });
        if can_open || can_close {
            let index = self.delims.len();
            self.delims.push(Delim {
                slot,
                ch,
                orig_len: len,
                can_open,
                can_close,
                prev: self.last_delim,
                next: None,
            });
            if let Some(last) = self.last_delim {
                self.delims[last].next = Some(index);
            }
            self.last_delim = Some(index);
        }
    }

    fn run_len(&self, delim: usize) -> usize {
        match self.slots[self.delims[delim].slot].piece {
            Piece::Run { len, .. } => len,
            _ => 0,
        }
    }

    fn shrink_run(&mut self, delim: usize, by: usize) {
        let slot = self.delims[delim].slot;
        if let Piece::Run { len, .. } = &mut self.slots[slot].piece {
            *len -= by;
        }
    }

    fn remove_delim(&mut self, index: usize) {
        let (prev, next) = (self.delims[index].prev, self.delims[index].next);
        if let Some(prev) = prev {
            self.delims[prev].next = next;
        }
        match next {
            Some(next) => self.delims[next].prev = prev,
            None => self.last_delim = prev,
        }
        self.delims[index].prev = None;
        self.delims[index].next = None;
    }

    /// Resolve every delimiter at or above `bottom`, then drop them
    pub(super) fn process_emphasis(&mut self, bottom: usize) {
        let mut openers_bottom = [[[bottom; 3]; 2]; 3];

        let mut closer = None;
        let mut cur = self.last_delim;
        while let Some(index) = cur {
            if index < bottom {
                break;
            }
            closer = Some(index);
            cur = self.delims[index].prev;
        }

        while let Some(c) = closer {
            let Delim {
                ch,
                orig_len,
                can_open,
                can_close,
                prev,
                next,
                ..
            } = self.delims[c];
            if !can_close {
                closer = next;
                continue;
            }

            let closer_len = self.run_len(c);
            let bucket = (char_index(ch), can_open as usize, orig_len % 3);
            let limit = openers_bottom[bucket.0][bucket.1][bucket.2];

            let mut found = None;
            let mut candidate = prev;
            while let Some(o) = candidate {
                if o < limit {
                    break;
                }
                let opener = &self.delims[o];
                if opener.ch == ch && opener.can_open {
                    let compatible = if ch == '~' {
                        self.run_len(o) == closer_len
                    } else {
                        let odd_match = (can_open || opener.can_close)
                            && (opener.orig_len + orig_len) % 3 == 0
                            && !(opener.orig_len % 3 == 0 && orig_len % 3 == 0);
                        !odd_match
                    };
                    if compatible {
                        found = Some(o);
                        break;
                    }
                }
                candidate = opener.prev;
            }
            let closer_slot = self.delims[c].slot;
            let found = found.filter(|&o| {
                self.depth_between(self.delims[o].slot, closer_slot) < MAX_INLINE_NESTING
            });

            match found {
                Some(o) => {
                    let (used, make): (usize, fn(Vec<Inline>) -> Inline) = if ch == '~' {
                        (closer_len, Inline::Strikethrough)
                    } else if self.run_len(o) >= 2 && closer_len >= 2 {
                        (2, Inline::Strong)
                    } else {
                        (1, Inline::Emphasis)
                    };
                    closer = self.wrap(o, c, used, make);
                }
                None => {
                    openers_bottom[bucket.0][bucket.1][bucket.2] = c;
                    if !can_open {
                        self.remove_delim(c);
                    }
                    closer = next;
                }
            }
        }

        let mut cur = self.last_delim;
        while let Some(index) = cur {
            if index < bottom {
                break;
            }
            cur = self.delims[index].prev;
            self.remove_delim(index);
        }
        self.delims.truncate(bottom);
    }

    /// Wrap everything between an opener and a closer, consuming `used`
    /// delimiter characters from each; returns the next closer to try
    fn wrap(
        &mut self,
        opener: usize,
        closer: usize,
        used: usize,
        make: fn(Vec<Inline>) -> Inline,
    ) -> Option<usize> {
        self.shrink_run(opener, used);
        self.shrink_run(closer, used);

        let (opener_slot, closer_slot) = (self.delims[opener].slot, self.delims[closer].slot);
        let (children, depth) = self.take_between(opener_slot, closer_slot);
        self.insert_after(opener_slot, Piece::Inline(make(children)), depth + 1);

        let mut between = self.delims[opener].next;
        while let Some(index) = between {
            if index == closer {
                break;
            }
            between = self.delims[index].next;
            self.remove_delim(index);
        }

        if self.run_len(opener) == 0 {
            self.unlink(opener_slot);
            self.remove_delim(opener);
        }
        if self.run_len(closer) == 0 {
            let next = self.delims[closer].next;
            self.unlink(closer_slot);
            self.remove_delim(closer);
            next
        } else {
            Some(closer)
        }
    }
}
