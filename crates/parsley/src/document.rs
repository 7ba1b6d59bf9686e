//! Converted documents

use crate::metadata::Metadata;

/// The result of [`parse`](crate::parse): title, source body, rendered body
/// and front-matter metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    title: String,
    raw_body: String,
    body: String,
    metadata: Metadata,
}

impl Document {
    /// Compose a document from its already-computed parts
    pub fn assemble(
        title: impl Into<String>,
        raw_body: impl Into<String>,
        body: impl Into<String>,
        metadata: Metadata,
    ) -> Self {
        Self {
            title: title.into(),
            raw_body: raw_body.into(),
            body: body.into(),
            metadata,
        }
    }

    /// The leading level-1 heading, else the `title` metadata value, else
    /// empty
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Markdown source of the body, front matter removed
    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    /// Rendered HTML of the body
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Look up one metadata value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Split into `(title, raw_body, body, metadata)`
    pub fn into_parts(self) -> (String, String, String, Metadata) {
        (self.title, self.raw_body, self.body, self.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble() {
        let mut metadata = Metadata::new();
        metadata.insert("author".to_string(), "Ada".to_string());
        let doc = Document::assemble("Title", "# Title", "<p>x</p>", metadata);

        assert_eq!(doc.title(), "Title");
        assert_eq!(doc.raw_body(), "# Title");
        assert_eq!(doc.body(), "<p>x</p>");
        assert_eq!(doc.get("author"), Some("Ada"));
        assert_eq!(doc.get("missing"), None);
    }

    #[test]
    fn test_into_parts() {
        let doc = Document::assemble("", "raw", "html", Metadata::new());
        let (title, raw, body, metadata) = doc.into_parts();
        assert_eq!((title.as_str(), raw.as_str(), body.as_str()), ("", "raw", "html"));
        assert!(metadata.is_empty());
    }
}
