//! Raw inline HTML and `<...>` autolinks

use once_cell::sync::Lazy;
use regex::Regex;

/// An HTML open tag, attributes included
pub(crate) const OPEN_TAG: &str = r#"<[A-Za-z][A-Za-z0-9-]*(?:[ \t\r\n]+[A-Za-z_:][A-Za-z0-9_.:-]*(?:[ \t\r\n]*=[ \t\r\n]*(?:[^ \t\r\n"'=<>`\x00-\x1f]+|'[^']*'|"[^"]*"))?)*[ \t\r\n]*/?>"#;

/// An HTML closing tag
pub(crate) const CLOSING_TAG: &str = r"</[A-Za-z][A-Za-z0-9-]*[ \t\r\n]*>";

static RAW_HTML: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:{}|{}|<!-->|<!--->|(?s:<!--.*?-->)|(?s:<\?.*?\?>)|<![A-Za-z][^>]*>|(?s:<!\[CDATA\[.*?\]\]>))",
        OPEN_TAG, CLOSING_TAG
    ))
    .expect("raw html pattern")
});

static URI_AUTOLINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<([A-Za-z][A-Za-z0-9.+-]{1,31}:[^<>\x00-\x20]*)>").expect("uri autolink pattern")
});

static EMAIL_AUTOLINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^<([A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*)>",
    )
    .expect("email autolink pattern")
});

/// Length of the raw HTML construct at the start of `s`
pub(crate) fn scan_raw_html(s: &str) -> Option<usize> {
    RAW_HTML.find(s).map(|m| m.end())
}

/// An autolink at the start of `s`: destination, link text, length
pub(crate) fn scan_autolink(s: &str) -> Option<(String, String, usize)> {
    if let Some(caps) = URI_AUTOLINK.captures(s) {
        let text = caps[1].to_string();
        return Some((text.clone(), text, caps[0].len()));
    }
    let caps = EMAIL_AUTOLINK.captures(s)?;
    let text = caps[1].to_string();
    Some((format!("mailto:{}", text), text, caps[0].len()))
}
