//! HTML escaping and URL safety helpers

/// Raw HTML tags GFM's tag filter neutralises
pub const DISALLOWED_TAGS: &[&str] = &[
    "title", "textarea", "style", "xmp", "iframe", "noembed", "noframes", "script",
    "plaintext",
];

/// URL schemes suppressed in safe mode
pub const DANGEROUS_URL_SCHEMES: &[&str] = &["javascript:", "vbscript:", "file:", "data:"];

/// `data:` payloads that are allowed through in safe mode
pub const SAFE_DATA_PREFIXES: &[&str] = &[
    "data:image/png",
    "data:image/gif",
    "data:image/jpeg",
    "data:image/webp",
];

/// Escape `&`, `<`, `>` and `"` for text content and attribute values
pub fn escape_html(text: &str, out: &mut String) {
    let mut last = 0;
    for (i, b) in text.bytes().enumerate() {
        let replacement = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            _ => continue,
        };
        out.push_str(&text[last..i]);
        out.push_str(replacement);
        last = i + 1;
    }
    out.push_str(&text[last..]);
}

/// Escape a link destination for an `href`/`src` attribute
///
/// Bytes outside the URL-safe set are percent-encoded; `&` and `'` become
/// entities so the value can sit inside a double-quoted attribute.
pub fn escape_href(url: &str, out: &mut String) {
    for b in url.bytes() {
        match b {
            b'&' => out.push_str("&amp;"),
            b'\'' => out.push_str("&#x27;"),
            b if is_href_safe(b) => out.push(b as char),
            b => {
                out.push('%');
                out.push_str(&format!("{:02X}", b));
            }
        }
    }
}

fn is_href_safe(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'-' | b'_'
                | b'.'
                | b'!'
                | b'~'
                | b'*'
                | b'('
                | b')'
                | b';'
                | b'/'
                | b'?'
                | b':'
                | b'@'
                | b'='
                | b'+'
                | b'$'
                | b','
                | b'%'
                | b'#'
        )
}

/// Check if a URL uses a scheme that safe mode must not emit
pub fn is_dangerous_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    if SAFE_DATA_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return false;
    }
    DANGEROUS_URL_SCHEMES.iter().any(|s| lower.starts_with(s))
}

/// Neutralise disallowed tags by escaping their leading `<`
pub fn filter_tags(html: &str, out: &mut String) {
    let bytes = html.as_bytes();
    let mut last = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'<' && is_disallowed_tag(&html[i + 1..]) {
            out.push_str(&html[last..i]);
            out.push_str("&lt;");
            last = i + 1;
        }
        i += 1;
    }
    out.push_str(&html[last..]);
}

fn is_disallowed_tag(rest: &str) -> bool {
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    DISALLOWED_TAGS.iter().any(|tag| {
        rest.len() >= tag.len()
            && rest.as_bytes()[..tag.len()].eq_ignore_ascii_case(tag.as_bytes())
            && matches!(
                rest.as_bytes().get(tag.len()),
                None | Some(b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
            )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escaped(text: &str) -> String {
        let mut out = String::new();
        escape_html(text, &mut out);
        out
    }

    fn href(url: &str) -> String {
        let mut out = String::new();
        escape_href(url, &mut out);
        out
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escaped("a < b && \"c\" > d"), "a &lt; b &amp;&amp; &quot;c&quot; &gt; d");
        assert_eq!(escaped("plain"), "plain");
        assert_eq!(escaped("naïve 'quote'"), "naïve 'quote'");
    }

    #[test]
    fn test_escape_href() {
        assert_eq!(href("https://example.com/a b"), "https://example.com/a%20b");
        assert_eq!(href("/search?q=1&r=2"), "/search?q=1&amp;r=2");
        assert_eq!(href("/ä"), "/%C3%A4");
        assert_eq!(href("/it's"), "/it&#x27;s");
        assert_eq!(href("/%20ok"), "/%20ok");
    }

    #[test]
    fn test_dangerous_urls() {
        assert!(is_dangerous_url("javascript:alert(1)"));
        assert!(is_dangerous_url("  JavaScript:alert(1)"));
        assert!(is_dangerous_url("data:text/html;base64,xyz"));
        assert!(!is_dangerous_url("data:image/png;base64,xyz"));
        assert!(!is_dangerous_url("https://example.com"));
    }

    #[test]
    fn test_filter_tags() {
        let mut out = String::new();
        filter_tags("<strong><script>x</script></strong><title>", &mut out);
        assert_eq!(out, "<strong>&lt;script>x&lt;/script></strong>&lt;title>");

        let mut out = String::new();
        filter_tags("<scripts> <styled>", &mut out);
        assert_eq!(out, "<scripts> <styled>");
    }
}
