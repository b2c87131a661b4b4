//! Cross-reference resolution for forwarding entries.
//!
//! A forwarding entry (`@@@LINK=target`) has no content of its own. It is
//! recorded during the main pass and, once every entry has been seen,
//! re-attached to the definition stored for its target. Only sections that
//! carry an erhua pairing are stored as targets.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::content::{Content, Definition};
use crate::markup::vocabulary::{marker, READING_TAG};
use crate::reading::Reading;
use crate::section::DefinitionSection;
use crate::zhuyin::Transliterator;

/// Prefix of a forwarding directive.
pub const LINK_DIRECTIVE: &str = "@@@LINK=";

/// Target headword of a forwarding entry, if `markup` is one.
///
/// The whole body, trimmed, must be the directive followed by a single line
/// holding the target. A directive inside ordinary markup is just text.
///
/// # Examples
///
/// ```
/// use cidian::resolver::parse_link_directive;
///
/// assert_eq!(parse_link_directive("@@@LINK=哪儿\n"), Some("哪儿"));
/// assert_eq!(parse_link_directive("<div>哪</div>"), None);
/// assert_eq!(parse_link_directive("<div>见@@@LINK=哪</div>"), None);
/// ```
pub fn parse_link_directive(markup: &str) -> Option<&str> {
    let target = markup.trim().strip_prefix(LINK_DIRECTIVE)?.trim();
    (!target.is_empty() && !target.contains(['\n', '\r'])).then_some(target)
}

/// A forwarding entry whose target never produced a linkable section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedLink {
    /// Headword of the forwarding entry.
    pub source: String,
    /// Headword it points to.
    pub target: String,
}

impl fmt::Display for UnresolvedLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// A forwarding entry re-attached to its target's definition.
#[derive(Debug, Clone)]
pub struct ResolvedLink {
    pub headword: String,
    pub reading: Reading,
    /// The target's stored definition, shared.
    pub definition: Arc<Definition>,
}

/// Outcome of the resolution pass.
#[derive(Debug, Default)]
pub struct Resolution {
    pub linked: Vec<ResolvedLink>,
    pub unresolved: Vec<UnresolvedLink>,
}

/// Run-scoped cross-reference tables.
///
/// Written during the main pass and consumed by [`resolve`](Self::resolve)
/// once it has finished.
#[derive(Debug, Default)]
pub struct LinkResolver {
    /// Forwarding headword → target, in first-seen order.
    pending: Vec<(String, String)>,
    pending_index: HashMap<String, usize>,
    /// Target headword → linkable definition.
    sources: HashMap<String, Arc<Definition>>,
}

impl LinkResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a forwarding entry. A repeated headword keeps its original
    /// position but takes the newer target.
    pub fn record_forwarding(&mut self, headword: &str, target: &str) {
        match self.pending_index.get(headword) {
            Some(&i) => self.pending[i].1 = target.to_string(),
            None => {
                self.pending_index
                    .insert(headword.to_string(), self.pending.len());
                self.pending
                    .push((headword.to_string(), target.to_string()));
            }
        }
    }

    /// Store `section` as a link target for `headword` if it carries an
    /// erhua pairing. Later sections replace earlier ones.
    pub fn record_section(&mut self, headword: &str, section: &DefinitionSection) -> bool {
        if !section.is_link_source() {
            return false;
        }
        self.sources
            .insert(headword.to_string(), Arc::clone(&section.definition));
        true
    }

    /// Forwarding entries waiting for resolution.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Headwords stored as link targets.
    pub fn source_len(&self) -> usize {
        self.sources.len()
    }

    /// Re-attach every forwarding entry to its target.
    ///
    /// Entries whose target was never stored are skipped and reported, one
    /// warning each.
    pub fn resolve(self, transliterator: &dyn Transliterator) -> Resolution {
        let mut resolution = Resolution::default();

        for (source, target) in self.pending {
            let Some(definition) = self.sources.get(&target) else {
                warn!(%source, %target, "Linked term not found");
                resolution.unresolved.push(UnresolvedLink { source, target });
                continue;
            };

            let reading = Reading::resolve(&linked_reading(definition), transliterator);
            resolution.linked.push(ResolvedLink {
                headword: source,
                reading,
                definition: Arc::clone(definition),
            });
        }

        resolution
    }
}

/// Pinyin of the first erhua reading pair in a stored definition.
fn linked_reading(definition: &Definition) -> String {
    definition
        .content
        .find_kind(READING_TAG)
        .and_then(|pair| {
            pair.content
                .iter()
                .find_map(|c| c.find_kind(marker::READING_PINYIN))
        })
        .map(|pinyin| pinyin.content.iter().map(Content::flat_text).collect())
        .unwrap_or_default()
}
