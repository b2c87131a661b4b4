//! Section readings: extraction, normalization and the zhuyin form.

use crate::markup::vocabulary::READING_TAG;
use crate::markup::{MarkupDom, MarkupData, NodeId};
use crate::zhuyin::Transliterator;

/// A reading in both notations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reading {
    /// Pinyin, syllable groups separated by spaces.
    pub primary: String,
    /// Zhuyin, written contiguously.
    pub secondary: String,
}

impl Reading {
    /// Normalize a raw pinyin reading and derive its zhuyin form.
    pub fn resolve(raw: &str, transliterator: &dyn Transliterator) -> Self {
        let primary = normalize_reading(raw);
        let secondary = secondary_reading(&primary, transliterator);
        Self { primary, secondary }
    }
}

/// Replace the source's syllable-boundary marks (`-`, `//`) with spaces.
///
/// # Examples
///
/// ```
/// use cidian::reading::normalize_reading;
///
/// assert_eq!(normalize_reading("ā-yí"), "ā yí");
/// assert_eq!(normalize_reading("yī//diǎnr"), "yī diǎnr");
/// ```
pub fn normalize_reading(raw: &str) -> String {
    raw.replace("//", " ").replace('-', " ")
}

/// Transliterate and drop the separators the transliterator keeps.
pub fn secondary_reading(primary: &str, transliterator: &dyn Transliterator) -> String {
    transliterator
        .transliterate(primary)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Flattened text of the first reading element in `nodes` (searched in
/// document order, descendants included), or an empty string.
pub fn find_section_reading(dom: &MarkupDom, nodes: &[NodeId]) -> String {
    nodes
        .iter()
        .find_map(|&root| {
            dom.find_from(root, |node| match &node.data {
                MarkupData::Element { name, .. } => name.local.as_ref() == READING_TAG,
                _ => false,
            })
        })
        .map(|id| dom.flat_text(id))
        .unwrap_or_default()
}
