//! Splitting an entry into independently defined sections.
//!
//! An entry's section container holds one or more senses separated by a
//! divider element. Each run between dividers becomes its own term, with its
//! own reading and definition.

use std::sync::Arc;

use crate::content::{Container, Content, Definition};
use crate::error::Result;
use crate::markup::vocabulary::{marker, DEFINITION_TERM_TAG, ERHUA_TAG};
use crate::markup::{MarkupDom, NodeId};
use crate::reading::{find_section_reading, Reading};
use crate::transpile::Transpiler;

/// Where sections live and what separates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLayout {
    /// Class of the element holding the sections.
    pub container_class: String,
    /// Tag name of the divider between sections.
    pub divider: String,
}

impl Default for SectionLayout {
    fn default() -> Self {
        Self {
            container_class: "HYGF2".to_string(),
            divider: "hr".to_string(),
        }
    }
}

/// One transpiled section.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionSection {
    pub reading: Reading,
    pub definition: Arc<Definition>,
}

impl DefinitionSection {
    /// Whether the section carries an erhua pairing that forwarding entries
    /// can borrow.
    pub fn is_link_source(&self) -> bool {
        self.definition
            .content
            .find_kind(ERHUA_TAG)
            .is_some()
    }
}

/// Split the section container into runs of top-level nodes.
///
/// Falls back to `<body>` when no element carries the container class.
/// Whitespace-only text nodes are dropped and runs left empty are skipped,
/// so an empty container yields no sections.
pub fn split_sections(dom: &MarkupDom, layout: &SectionLayout) -> Vec<Vec<NodeId>> {
    let Some(container) = dom
        .find_by_class(&layout.container_class)
        .or_else(|| dom.find_by_tag("body"))
    else {
        return Vec::new();
    };

    let mut sections = Vec::new();
    let mut current = Vec::new();
    for child in dom.children(container) {
        if dom.is_tag(child, &layout.divider) {
            sections.push(std::mem::take(&mut current));
            continue;
        }
        let blank = dom
            .text_content(child)
            .is_some_and(|t| t.trim().is_empty());
        if !blank {
            current.push(child);
        }
    }
    sections.push(current);

    sections.retain(|run| !run.is_empty());
    sections
}

/// Remove the traditional-form annotation from a section and return it.
///
/// The annotation is the first text node before the first `dt` that holds a
/// full-width parenthesized span, e.g. `（愛）`.
pub fn take_traditional_form(dom: &MarkupDom, nodes: &mut Vec<NodeId>) -> Option<String> {
    let (index, form) = nodes
        .iter()
        .take_while(|&&id| !dom.is_tag(id, DEFINITION_TERM_TAG))
        .enumerate()
        .find_map(|(i, &id)| {
            dom.text_content(id)
                .and_then(parenthesized)
                .map(|form| (i, form.to_string()))
        })?;
    nodes.remove(index);
    Some(form)
}

/// Inner text of the first non-empty `（…）` span.
fn parenthesized(text: &str) -> Option<&str> {
    let text = text.trim();
    let mut rest = text;
    while let Some(open) = rest.find('（') {
        let after = &rest[open + '（'.len_utf8()..];
        let close = after.find('）')?;
        if close > 0 {
            return Some(&after[..close]);
        }
        rest = &after[close + '）'.len_utf8()..];
    }
    None
}

/// Build the reading and structured content of one section.
pub fn build_section(
    dom: &MarkupDom,
    mut nodes: Vec<NodeId>,
    transpiler: &mut Transpiler,
) -> Result<DefinitionSection> {
    let reading = Reading::resolve(
        &find_section_reading(dom, &nodes),
        transpiler.transliterator(),
    );
    let traditional = take_traditional_form(dom, &mut nodes);

    let mut content = transpiler.transpile_all(dom, &nodes)?;
    if let Some(form) = traditional {
        let trad = Container::new(marker::TRADITIONAL)
            .with_lang("zh-TW")
            .with_content(vec![Content::Text(form)]);
        content.insert(content.len().min(1), Content::Container(trad));
    }

    let root = Container::new(marker::DEFINITIONS)
        .with_lang("zh-CN")
        .with_content(content);

    Ok(DefinitionSection {
        reading,
        definition: Arc::new(Definition::new(Content::Container(root))),
    })
}
