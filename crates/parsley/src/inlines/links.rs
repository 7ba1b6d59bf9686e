//! Link label, destination and title scanners
//!
//! Shared by inline links and link reference definitions. Each scanner looks
//! at the start of its input and returns what it matched plus the number of
//! bytes consumed.

use super::entities::unescape;

/// Longest link label, in characters
pub(crate) const MAX_LABEL_CHARS: usize = 999;

const MAX_PAREN_DEPTH: usize = 32;

/// Scan a `[label]`; the label must contain a non-whitespace character
pub(crate) fn scan_link_label(s: &str) -> Option<(&str, usize)> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'[') {
        return None;
    }
    let mut i = 1;
    let mut chars = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if bytes.get(i + 1).is_some_and(u8::is_ascii_punctuation) => i += 2,
            b'[' => return None,
            b']' => {
                let label = &s[1..i];
                if label.trim().is_empty() {
                    return None;
                }
                return Some((label, i + 1));
            }
            _ => i += 1,
        }
        chars += 1;
        if chars > MAX_LABEL_CHARS {
            return None;
        }
    }
    None
}

/// Scan a link destination, either `<...>` or a run without spaces and with
/// balanced parentheses
pub(crate) fn scan_link_destination(s: &str) -> Option<(String, usize)> {
    let bytes = s.as_bytes();
    if bytes.first() == Some(&b'<') {
        let mut i = 1;
        while i < bytes.len() {
            match bytes[i] {
                b'>' => return Some((unescape(&s[1..i]).into_owned(), i + 1)),
                b'\n' | b'<' => return None,
                b'\\' if bytes.get(i + 1).is_some_and(u8::is_ascii_punctuation) => i += 2,
                _ => i += 1,
            }
        }
        return None;
    }

    let mut depth = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if bytes.get(i + 1).is_some_and(u8::is_ascii_punctuation) => i += 2,
            b'(' => {
                depth += 1;
                if depth > MAX_PAREN_DEPTH {
                    return None;
                }
                i += 1;
            }
            b')' if depth == 0 => break,
            b')' => {
                depth -= 1;
                i += 1;
            }
            b if b <= b' ' || b == 0x7f => break,
            _ => i += 1,
        }
    }
    if i == 0 || depth != 0 {
        return None;
    }
    Some((unescape(&s[..i]).into_owned(), i))
}

/// Scan a link title in `"..."`, `'...'` or `(...)`
pub(crate) fn scan_link_title(s: &str) -> Option<(String, usize)> {
    let bytes = s.as_bytes();
    let close = match bytes.first()? {
        b'"' => b'"',
        b'\'' => b'\'',
        b'(' => b')',
        _ => return None,
    };
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if bytes.get(i + 1).is_some_and(u8::is_ascii_punctuation) => i += 2,
            b if b == close => return Some((unescape(&s[1..i]).into_owned(), i + 1)),
            b'(' if close == b')' => return None,
            _ => i += 1,
        }
    }
    None
}

/// Count spaces and tabs, plus at most one line ending, from the start of `s`
pub(crate) fn skip_spaces_and_newline(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut seen_newline = false;
    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' => i += 1,
            b'\n' if !seen_newline => {
                seen_newline = true;
                i += 1;
            }
            _ => break,
        }
    }
    i
}

/// Count spaces and tabs from the start of `s`
pub(crate) fn skip_spaces(s: &str) -> usize {
    s.bytes().take_while(|b| matches!(b, b' ' | b'\t')).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label() {
        assert_eq!(scan_link_label("[foo] bar"), Some(("foo", 5)));
        assert_eq!(scan_link_label(r"[a\]b]"), Some((r"a\]b", 6)));
        assert_eq!(scan_link_label("[a[b]"), None);
        assert_eq!(scan_link_label("[  ]"), None);
        assert_eq!(scan_link_label("[open"), None);
        assert_eq!(scan_link_label(&format!("[{}]", "x".repeat(1000))), None);
    }

    #[test]
    fn test_destination() {
        assert_eq!(scan_link_destination("/url rest"), Some(("/url".to_string(), 4)));
        assert_eq!(scan_link_destination("<a b>"), Some(("a b".to_string(), 5)));
        assert_eq!(scan_link_destination("<>"), Some((String::new(), 2)));
        assert_eq!(scan_link_destination("a(b)c)"), Some(("a(b)c".to_string(), 5)));
        assert_eq!(scan_link_destination(r"a\)b"), Some(("a)b".to_string(), 4)));
        assert_eq!(scan_link_destination("a(b"), None);
        assert_eq!(scan_link_destination("<a\nb>"), None);
        assert_eq!(scan_link_destination(")"), None);
    }

    #[test]
    fn test_title() {
        assert_eq!(scan_link_title("\"t\" x"), Some(("t".to_string(), 3)));
        assert_eq!(scan_link_title("'it''s'"), Some(("it".to_string(), 4)));
        assert_eq!(scan_link_title("(paren)"), Some(("paren".to_string(), 7)));
        assert_eq!(scan_link_title(r#""a \" b""#), Some(("a \" b".to_string(), 8)));
        assert_eq!(scan_link_title("(a(b)"), None);
        assert_eq!(scan_link_title("\"open"), None);
        assert_eq!(scan_link_title("bare"), None);
    }

    #[test]
    fn test_whitespace_skipping() {
        assert_eq!(skip_spaces_and_newline("  \n  x"), 5);
        assert_eq!(skip_spaces_and_newline(" \n\nx"), 2);
        assert_eq!(skip_spaces("\t x"), 2);
    }
}
