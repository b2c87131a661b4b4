//! The tag vocabulary of 现代汉语规范词典 entry markup.
//!
//! Only tags with a dedicated transpilation rule get a variant; every other
//! tag name (headword display, sense numbers, part of speech, examples,
//! dividers, ...) falls through to [`TagKind::Generic`].

/// Tag holding a pinyin reading.
pub const READING_TAG: &str = "x-pr";

/// Tag marking an erhua (or other alternate pronunciation) word form.
pub const ERHUA_TAG: &str = "x-hwp";

/// Tag that ends the search for a traditional-form annotation.
pub const DEFINITION_TERM_TAG: &str = "dt";

/// Metadata key under which every container records its origin.
pub const DATA_KEY: &str = "guifan";

/// Metadata value for elements without a tag name.
pub const NO_TAG: &str = "no-tag";

/// Tagging rule for one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// `x-hw`, `x-hws`: headword shown in simplified script.
    Simplified,
    /// `x-pr`: reading, already lifted to the section level.
    Reading,
    /// `a`: cross-reference to another headword.
    Anchor,
    /// `img`: inline image, usually a data URI.
    Image,
    /// `x-hwp`: erhua word form paired with its own reading.
    Erhua,
    /// `br`
    LineBreak,
    /// Anything else.
    Generic,
}

impl TagKind {
    pub fn classify(tag: &str) -> Self {
        match tag {
            "x-hw" | "x-hws" => TagKind::Simplified,
            READING_TAG => TagKind::Reading,
            "a" => TagKind::Anchor,
            "img" => TagKind::Image,
            ERHUA_TAG => TagKind::Erhua,
            "br" => TagKind::LineBreak,
            _ => TagKind::Generic,
        }
    }
}

/// Metadata values the transpiler stamps on containers it synthesizes.
pub mod marker {
    pub const SIMPLIFIED: &str = "simp";
    pub const TRADITIONAL: &str = "trad";
    pub const DEFINITIONS: &str = "definitions-parent";
    pub const READING_PINYIN: &str = "reading-pinyin";
    pub const READING_ZHUYIN: &str = "reading-zhuyin";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_tags() {
        assert_eq!(TagKind::classify("x-hw"), TagKind::Simplified);
        assert_eq!(TagKind::classify("x-hws"), TagKind::Simplified);
        assert_eq!(TagKind::classify("x-pr"), TagKind::Reading);
        assert_eq!(TagKind::classify("x-hwp"), TagKind::Erhua);
        assert_eq!(TagKind::classify("img"), TagKind::Image);
        assert_eq!(TagKind::classify("br"), TagKind::LineBreak);
    }

    #[test]
    fn test_unknown_tags_are_generic() {
        for tag in ["x-dfn", "x-pos", "x-ex", "hr", "div", "made-up"] {
            assert_eq!(TagKind::classify(tag), TagKind::Generic, "{tag}");
        }
    }
}
