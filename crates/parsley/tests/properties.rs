//! Property-based tests for conversion
//!
//! These check that conversion never fails on arbitrary input, that rendered
//! output stays balanced, and that the metadata helpers agree with each other.

use proptest::prelude::*;

use parsley::metadata::{parse_metadata, render_metadata_block};
use parsley::{Metadata, Options};

/// Text built mostly from Markdown punctuation so constructs actually form
fn markdown_strategy() -> impl Strategy<Value = String> {
    let pieces = prop::sample::select(vec![
        "*", "**", "_", "__", "~~", "`", "``", "[", "]", "(", ")", "![", "<", ">", "&", "&amp;",
        "#", "- ", "1. ", "> ", "|", "---", "\n", "\n\n", "    ", " ", "\\", "a", "word",
        "www.x.com", "[x]: /u", "```", "<b>", "</b>", ":",
    ]);
    prop::collection::vec(pieces, 0..60).prop_map(|parts| parts.concat())
}

fn metadata_strategy() -> impl Strategy<Value = Metadata> {
    let key = "[a-z][a-z0-9_]{0,8}";
    let value = "([A-Za-z0-9,.:!/-]([A-Za-z0-9 ,.:!/-]{0,18}[A-Za-z0-9,.:!/-])?)?";
    prop::collection::vec((key, value), 0..8).prop_map(|pairs| {
        let mut metadata = Metadata::new();
        for (key, value) in pairs {
            metadata.entry(key).or_insert(value);
        }
        metadata
    })
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

proptest! {
    #[test]
    fn test_arbitrary_input_converts(input in any::<String>()) {
        prop_assert!(parsley::html(&input, &Options::default()).is_ok());
        prop_assert!(parsley::parse(&input, &Options::gfm()).is_ok());
    }

    #[test]
    fn test_markdown_input_converts(input in markdown_strategy()) {
        let options = Options::gfm().with(parsley::Flag::Unsafe);
        prop_assert!(parsley::html(&input, &options).is_ok());
    }

    #[test]
    fn test_safe_output_is_balanced(input in markdown_strategy()) {
        let output = parsley::html(&input, &Options::gfm()).unwrap();
        for tag in ["em", "strong", "del", "p", "li", "blockquote", "table", "code"] {
            prop_assert_eq!(
                count(&output, &format!("<{}>", tag)) + count(&output, &format!("<{} ", tag)),
                count(&output, &format!("</{}>", tag)),
                "unbalanced <{}> in {:?}",
                tag,
                output
            );
        }
    }

    #[test]
    fn test_escaped_text_is_stable(tail in "[0-9 &<>\"]{0,30}") {
        let input = format!("x{}", tail);
        let first = parsley::html(&input, &Options::default()).unwrap();
        let inner = first
            .strip_prefix("<p>")
            .and_then(|s| s.strip_suffix("</p>\n"))
            .unwrap();
        let second = parsley::html(inner, &Options::default()).unwrap();
        prop_assert_eq!(second, first);
    }

    #[test]
    fn test_metadata_round_trip(metadata in metadata_strategy()) {
        let block = render_metadata_block(&metadata);
        prop_assert_eq!(parse_metadata(&block), metadata);
    }

    #[test]
    fn test_first_metadata_value_wins(
        key in "[a-z]{1,8}",
        first in "[a-z0-9]{1,10}",
        second in "[a-z0-9]{1,10}",
    ) {
        let block = format!("{key}: {first}\n{key}: {second}\n");
        let metadata = parse_metadata(&block);
        prop_assert_eq!(metadata.len(), 1);
        prop_assert_eq!(&metadata[key.as_str()], &first);
    }

    #[test]
    fn test_front_matter_never_leaks_into_body(
        metadata in metadata_strategy(),
        body in "[a-z ]{1,40}",
    ) {
        let source = format!("---\n{}---\n{}", render_metadata_block(&metadata), body);
        let doc = parsley::parse(&source, &Options::default()).unwrap();
        prop_assert_eq!(doc.metadata(), &metadata);
        prop_assert_eq!(doc.raw_body(), body.as_str());
    }
}
