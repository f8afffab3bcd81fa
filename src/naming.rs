//! Template-name convention.
//!
//! A template's name is its kind prefixed by zero or more qualifier words,
//! space separated and in a fixed order:
//!
//! - `"feature"` → kind=Feature, no qualifiers
//! - `"first raw community feature"` → kind=Feature, qualifiers=[First, Raw, Community]
//! - `"hub original post"` → kind=OriginalPost, qualifiers=[Hub]
//!
//! The kind is matched as a suffix because `"original post"` contains a space.

use std::fmt;

/// The three always-generated script bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Feature,
    Comment,
    OriginalPost,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 3] = [Self::Feature, Self::Comment, Self::OriginalPost];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Comment => "comment",
            Self::OriginalPost => "original post",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variant qualifier words, in the order they appear in a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Qualifier {
    First,
    Raw,
    Community,
    Hub,
}

impl Qualifier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Raw => "raw",
            Self::Community => "community",
            Self::Hub => "hub",
        }
    }

    fn parse(word: &str) -> Option<Self> {
        match word {
            "first" => Some(Self::First),
            "raw" => Some(Self::Raw),
            "community" => Some(Self::Community),
            "hub" => Some(Self::Hub),
            _ => None,
        }
    }
}

/// Build the template name for a kind and its qualifiers.
pub fn template_name(qualifiers: &[Qualifier], kind: TemplateKind) -> String {
    let mut name = String::new();
    for q in qualifiers {
        name.push_str(q.as_str());
        name.push(' ');
    }
    name.push_str(kind.as_str());
    name
}

/// Result of parsing a template name like `"first raw feature"`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTemplateName {
    pub kind: TemplateKind,
    pub qualifiers: Vec<Qualifier>,
    /// Prefix words that are not known qualifiers.
    pub unknown: Vec<String>,
}

/// Parse a template name. Returns `None` when it doesn't end in a known kind.
pub fn parse_template_name(name: &str) -> Option<ParsedTemplateName> {
    let name = name.trim();
    let (kind, prefix) = TemplateKind::ALL.iter().find_map(|&kind| {
        let prefix = name.strip_suffix(kind.as_str())?;
        (prefix.is_empty() || prefix.ends_with(' ')).then_some((kind, prefix))
    })?;

    let mut qualifiers = Vec::new();
    let mut unknown = Vec::new();
    for word in prefix.split_whitespace() {
        match Qualifier::parse(word) {
            Some(q) => qualifiers.push(q),
            None => unknown.push(word.to_string()),
        }
    }
    Some(ParsedTemplateName {
        kind,
        qualifiers,
        unknown,
    })
}
