//! Bare URL and email autolinks
//!
//! Runs over finished inline text, so code spans, raw HTML and existing
//! links are never touched.

use once_cell::sync::Lazy;
use regex::Regex;

use parsley_core::Inline;

static URL_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:https?://|ftp://|www\.)").expect("url start pattern"));

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9.+_-]+@[A-Za-z0-9_-]+(?:\.[A-Za-z0-9_-]+)+").expect("email pattern")
});

/// Link bare `www.`, `http(s)://`, `ftp://` and email addresses in text
pub(crate) fn link_bare_urls(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut out = Vec::with_capacity(inlines.len());
    for inline in inlines {
        match inline {
            Inline::Text(text) => split_urls(&text, &mut out),
            Inline::Emphasis(children) => out.push(Inline::Emphasis(link_bare_urls(children))),
            Inline::Strong(children) => out.push(Inline::Strong(link_bare_urls(children))),
            Inline::Strikethrough(children) => {
                out.push(Inline::Strikethrough(link_bare_urls(children)))
            }
            other => out.push(other),
        }
    }
    out
}

fn split_urls(text: &str, out: &mut Vec<Inline>) {
    let mut last = 0;
    for m in URL_START.find_iter(text) {
        let start = m.start();
        if start < last || !valid_preceding(text, start) {
            continue;
        }
        let www = m.as_str().eq_ignore_ascii_case("www.");
        let domain_start = if www { start } else { m.end() };
        let Some(end) = url_end(text, domain_start) else {
            continue;
        };

        split_emails(&text[last..start], out);
        let link = &text[start..end];
        let url = if www {
            format!("http://{}", link)
        } else {
            link.to_string()
        };
        out.push(Inline::Autolink {
            url,
            text: link.to_string(),
        });
        last = end;
    }
    split_emails(&text[last..], out);
}

fn split_emails(text: &str, out: &mut Vec<Inline>) {
    let mut last = 0;
    for m in EMAIL.find_iter(text) {
        if m.as_str().ends_with(&['-', '_'][..]) {
            continue;
        }
        push_text(&text[last..m.start()], out);
        out.push(Inline::Autolink {
            url: format!("mailto:{}", m.as_str()),
            text: m.as_str().to_string(),
        });
        last = m.end();
    }
    push_text(&text[last..], out);
}

fn push_text(text: &str, out: &mut Vec<Inline>) {
    if !text.is_empty() {
        out.push(Inline::Text(text.to_string()));
    }
}

/// A link may only start at the beginning of text, after whitespace or
/// after one of `*`, `_`, `~` and `(`
fn valid_preceding(text: &str, start: usize) -> bool {
    match text[..start].chars().next_back() {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, '*' | '_' | '~' | '('),
    }
}

fn url_end(text: &str, domain_start: usize) -> Option<usize> {
    let domain_end = domain_start + scan_domain(&text[domain_start..])?;
    let rest = &text[domain_end..];
    let tail = rest
        .find(|c: char| c.is_whitespace() || c == '<')
        .unwrap_or(rest.len());
    let end = domain_start + trim_trailing(&text[domain_start..domain_end + tail]);
    if end <= domain_start {
        return None;
    }
    Some(end)
}

fn is_domain_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Length of a valid domain: at least two dot-separated segments, with no
/// underscore in the last two
fn scan_domain(s: &str) -> Option<usize> {
    let mut underscores = Vec::new();
    let mut segment_len = 0;
    let mut segment_underscore = false;
    let mut end = 0;

    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '.' {
            let continues = matches!(chars.peek(), Some(&(_, next)) if is_domain_char(next));
            if segment_len == 0 || !continues {
                break;
            }
            underscores.push(segment_underscore);
            segment_len = 0;
            segment_underscore = false;
        } else if is_domain_char(c) {
            segment_len += 1;
            segment_underscore |= c == '_';
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    if segment_len > 0 {
        underscores.push(segment_underscore);
    }

    if underscores.len() < 2 || underscores[underscores.len() - 2..].contains(&true) {
        return None;
    }
    Some(end)
}

/// Drop trailing punctuation, unbalanced `)` and entity-like `&name;`
fn trim_trailing(link: &str) -> usize {
    let mut link = link;
    let opens = link.matches('(').count();
    let mut closes = link.matches(')').count();
    loop {
        let Some(last) = link.chars().next_back() else {
            return 0;
        };
        match last {
            '?' | '!' | '.' | ',' | ':' | '*' | '_' | '~' => {
                link = &link[..link.len() - 1];
            }
            ')' => {
                if closes <= opens {
                    break;
                }
                closes -= 1;
                link = &link[..link.len() - 1];
            }
            ';' => {
                let body = &link[..link.len() - 1];
                match body.rfind('&') {
                    Some(amp)
                        if amp + 1 < body.len()
                            && body[amp + 1..].bytes().all(|b| b.is_ascii_alphanumeric()) =>
                    {
                        link = &link[..amp];
                    }
                    _ => break,
                }
            }
            _ => break,
        }
    }
    link.len()
}
