//! Conversion options
//!
//! Options are a set of named flags. The default set is `{safe}`: no GFM
//! extensions and no raw HTML in the output.

use std::fmt;
use std::str::FromStr;

/// A single named option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Suppress raw HTML and dangerous link schemes (the default)
    Safe,
    /// Pass raw HTML through verbatim; overrides `Safe`
    Unsafe,
    /// GFM pipe tables
    Tables,
    /// `~~text~~`
    Strikethrough,
    /// Bare URL and e-mail autolinking
    Autolink,
    /// `- [ ]` / `- [x]` checkboxes
    Tasklist,
    /// Render soft line breaks as `<br />`
    HardBreaks,
    /// Render soft line breaks as spaces
    NoBreaks,
    /// Escape the GFM disallowed raw HTML tags even when `Unsafe`
    TagFilter,
    /// `<pre lang="x">` instead of a `language-x` class
    GithubPreLang,
    /// `style="text-align: x"` instead of `align="x"` on table cells
    TableStyleAttributes,
}

impl Flag {
    /// Every flag, in declaration order
    pub const ALL: [Flag; 11] = [
        Flag::Safe,
        Flag::Unsafe,
        Flag::Tables,
        Flag::Strikethrough,
        Flag::Autolink,
        Flag::Tasklist,
        Flag::HardBreaks,
        Flag::NoBreaks,
        Flag::TagFilter,
        Flag::GithubPreLang,
        Flag::TableStyleAttributes,
    ];

    /// The lowercase configuration name of this flag
    pub fn name(&self) -> &'static str {
        match self {
            Flag::Safe => "safe",
            Flag::Unsafe => "unsafe",
            Flag::Tables => "tables",
            Flag::Strikethrough => "strikethrough",
            Flag::Autolink => "autolink",
            Flag::Tasklist => "tasklist",
            Flag::HardBreaks => "hardbreaks",
            Flag::NoBreaks => "nobreaks",
            Flag::TagFilter => "tagfilter",
            Flag::GithubPreLang => "githubprelang",
            Flag::TableStyleAttributes => "tablestyleattributes",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a flag name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown option flag: {0}")]
pub struct UnknownFlag(pub String);

impl FromStr for Flag {
    type Err = UnknownFlag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        Flag::ALL
            .into_iter()
            .find(|flag| flag.name() == normalized)
            .ok_or_else(|| UnknownFlag(s.to_string()))
    }
}

/// Options for parsing and rendering
///
/// Passed by reference into every stage and never mutated during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    /// Emit raw HTML verbatim instead of omitting it
    pub unsafe_html: bool,

    /// Parse GFM tables
    pub tables: bool,

    /// Parse `~text~` and `~~text~~`
    pub strikethrough: bool,

    /// Link bare URLs, `www.` hosts and e-mail addresses
    pub autolink: bool,

    /// Turn leading `[ ]`/`[x]` in list items into checkboxes
    pub tasklist: bool,

    /// Soft breaks become `<br />`
    pub hard_breaks: bool,

    /// Soft breaks become a space
    pub no_breaks: bool,

    /// Escape disallowed raw HTML tags
    pub tag_filter: bool,

    /// Put the code block language on `<pre lang>`
    pub github_pre_lang: bool,

    /// Use inline styles for table cell alignment
    pub table_style_attributes: bool,
}

impl Options {
    /// Options with every GFM extension switched on, still safe
    pub fn gfm() -> Self {
        Self::from_flags(&[
            Flag::Tables,
            Flag::Strikethrough,
            Flag::Autolink,
            Flag::Tasklist,
            Flag::TagFilter,
        ])
    }

    /// Build options from a set of flags
    ///
    /// `Unsafe` wins over `Safe` regardless of order, since safe is the
    /// posture every option set starts from.
    pub fn from_flags(flags: &[Flag]) -> Self {
        flags.iter().copied().collect()
    }

    /// Return a copy with one more flag set
    pub fn with(mut self, flag: Flag) -> Self {
        self.set(flag);
        self
    }

    /// Whether the given flag is in effect
    pub fn contains(&self, flag: Flag) -> bool {
        match flag {
            Flag::Safe => !self.unsafe_html,
            Flag::Unsafe => self.unsafe_html,
            Flag::Tables => self.tables,
            Flag::Strikethrough => self.strikethrough,
            Flag::Autolink => self.autolink,
            Flag::Tasklist => self.tasklist,
            Flag::HardBreaks => self.hard_breaks,
            Flag::NoBreaks => self.no_breaks && !self.hard_breaks,
            Flag::TagFilter => self.tag_filter,
            Flag::GithubPreLang => self.github_pre_lang,
            Flag::TableStyleAttributes => self.table_style_attributes,
        }
    }

    /// The flags in effect, in declaration order
    pub fn flags(&self) -> Vec<Flag> {
        Flag::ALL
            .into_iter()
            .filter(|flag| self.contains(*flag))
            .collect()
    }

    fn set(&mut self, flag: Flag) {
        match flag {
            Flag::Safe => {}
            Flag::Unsafe => self.unsafe_html = true,
            Flag::Tables => self.tables = true,
            Flag::Strikethrough => self.strikethrough = true,
            Flag::Autolink => self.autolink = true,
            Flag::Tasklist => self.tasklist = true,
            Flag::HardBreaks => self.hard_breaks = true,
            Flag::NoBreaks => self.no_breaks = true,
            Flag::TagFilter => self.tag_filter = true,
            Flag::GithubPreLang => self.github_pre_lang = true,
            Flag::TableStyleAttributes => self.table_style_attributes = true,
        }
    }
}

impl FromIterator<Flag> for Options {
    fn from_iter<I: IntoIterator<Item = Flag>>(iter: I) -> Self {
        let mut options = Options::default();
        for flag in iter {
            options.set(flag);
        }
        options
    }
}
