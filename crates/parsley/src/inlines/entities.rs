//! Character references and backslash escapes

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^&(?:#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("entity pattern")
});

/// Decode the character reference at the start of `s`
///
/// Returns the decoded text and the length of the reference. Unknown names
/// are not references and yield `None`.
pub(crate) fn decode_entity(s: &str) -> Option<(Cow<'static, str>, usize)> {
    let m = ENTITY.find(s)?;
    let token = m.as_str();
    let body = &token[1..token.len() - 1];

    if let Some(number) = body.strip_prefix('#') {
        let code = match number.strip_prefix(&['x', 'X'][..]) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => number.parse::<u32>().ok(),
        };
        let c = code
            .filter(|c| *c != 0)
            .and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        return Some((Cow::Owned(c.to_string()), token.len()));
    }

    // A legacy name decoded from a prefix leaves the rest of the token behind
    match html_escape::decode_html_entities(token) {
        Cow::Owned(decoded)
            if decoded != token && !(decoded.len() > 1 && decoded.ends_with(';')) =>
        {
            Some((Cow::Owned(decoded), token.len()))
        }
        _ => None,
    }
}

/// Resolve backslash escapes and character references
///
/// Used for link destinations, titles and code fence info strings.
pub(crate) fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains(&['\\', '&'][..]) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(i) = rest.find(&['\\', '&'][..]) {
        out.push_str(&rest[..i]);
        rest = &rest[i..];
        if rest.starts_with('\\') {
            match rest[1..].chars().next() {
                Some(c) if c.is_ascii_punctuation() => {
                    out.push(c);
                    rest = &rest[2..];
                }
                _ => {
                    out.push('\\');
                    rest = &rest[1..];
                }
            }
        } else if let Some((decoded, len)) = decode_entity(rest) {
            out.push_str(&decoded);
            rest = &rest[len..];
        } else {
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}
