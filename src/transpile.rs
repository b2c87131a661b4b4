//! Markup to structured-content transpilation.
//!
//! Each markup node becomes zero or more content nodes. Dispatch goes
//! through [`TagKind`]; tags without a rule become a generic container named
//! after the tag. A container whose children all come out empty is dropped,
//! so emptiness propagates up the tree.

use std::collections::HashSet;
use std::sync::Arc;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::content::{Container, Content, Image, Link};
use crate::error::{Error, Result};
use crate::markup::vocabulary::{marker, NO_TAG, READING_TAG};
use crate::markup::{MarkupDom, NodeId, NodeKind, TagKind};
use crate::reading::{normalize_reading, secondary_reading};
use crate::zhuyin::Transliterator;

/// Characters left unescaped in search links, as in form encoding.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

/// Lenient base64, like browsers: padding optional.
const DATA_URI_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Glyph pointing from an erhua form back to its base word.
pub const ERHUA_ARROW: &str = "←";

/// An image waiting to be written to the lexicons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Hex SHA-256 of the `src` attribute.
    pub hash: String,
    /// Path inside the lexicon archive.
    pub path: String,
    pub bytes: Arc<Vec<u8>>,
}

/// Archive path of the image with content hash `hash`.
pub fn image_path(hash: &str) -> String {
    format!("img/{hash}.png")
}

/// Dictionary search link for `query`, wildcards off.
///
/// # Examples
///
/// ```
/// use cidian::transpile::search_href;
///
/// assert_eq!(search_href("阿"), "?query=%E9%98%BF&wildcards=off");
/// ```
pub fn search_href(query: &str) -> String {
    format!(
        "?query={}&wildcards=off",
        utf8_percent_encode(query, QUERY_ENCODE_SET)
    )
}

/// Transpiles the markup of one run.
///
/// Image hashes are remembered for the whole run so each image is handed
/// to the lexicons once; assets found in the current entry accumulate until
/// [`take_images`](Self::take_images).
pub struct Transpiler {
    transliterator: Arc<dyn Transliterator>,
    persisted: HashSet<String>,
    pending: Vec<ImageAsset>,
    missing_image_sources: usize,
}

impl Transpiler {
    pub fn new(transliterator: Arc<dyn Transliterator>) -> Self {
        Self {
            transliterator,
            persisted: HashSet::new(),
            pending: Vec::new(),
            missing_image_sources: 0,
        }
    }

    pub fn transliterator(&self) -> &dyn Transliterator {
        self.transliterator.as_ref()
    }

    /// Drain images first seen since the last call.
    pub fn take_images(&mut self) -> Vec<ImageAsset> {
        std::mem::take(&mut self.pending)
    }

    /// Image elements skipped for lack of a `src`.
    pub fn missing_image_sources(&self) -> usize {
        self.missing_image_sources
    }

    /// Transpile a sequence of sibling nodes.
    pub fn transpile_all(&mut self, dom: &MarkupDom, ids: &[NodeId]) -> Result<Vec<Content>> {
        let mut out = Vec::new();
        for &id in ids {
            out.extend(self.transpile(dom, id)?);
        }
        Ok(out)
    }

    /// Transpile one node. An empty result means the node produced nothing.
    pub fn transpile(&mut self, dom: &MarkupDom, id: NodeId) -> Result<Vec<Content>> {
        match dom.kind(id)? {
            NodeKind::Text => {
                let text = dom.text_content(id).unwrap_or_default().trim();
                Ok(if text.is_empty() {
                    vec![]
                } else {
                    vec![Content::text(text)]
                })
            }
            NodeKind::Ignorable => Ok(vec![]),
            NodeKind::Element => self.transpile_element(dom, id),
        }
    }

    fn transpile_element(&mut self, dom: &MarkupDom, id: NodeId) -> Result<Vec<Content>> {
        let tag = dom.element_name(id).map(|n| &**n).unwrap_or_default();

        match TagKind::classify(tag) {
            TagKind::Reading => Ok(vec![]),
            TagKind::LineBreak => Ok(vec![Content::text("\n")]),
            TagKind::Simplified => {
                let children = self.children_of(dom, id)?;
                Ok(wrap(
                    Container::new(marker::SIMPLIFIED).with_class(dom.get_attr(id, "class")),
                    children,
                ))
            }
            // A link is kept even when its visible content is empty; only
            // containers are elided.
            TagKind::Anchor => {
                let content = self.children_of(dom, id)?;
                Ok(vec![Content::Link(Link {
                    href: search_href(&dom.flat_text(id)),
                    content,
                })])
            }
            TagKind::Image => Ok(self.image(dom, id)?.into_iter().collect()),
            TagKind::Erhua => self.erhua(dom, id, tag),
            TagKind::Generic => self.generic(dom, id, tag),
        }
    }

    fn children_of(&mut self, dom: &MarkupDom, id: NodeId) -> Result<Vec<Content>> {
        let children: Vec<_> = dom.children(id).collect();
        self.transpile_all(dom, &children)
    }

    fn generic(&mut self, dom: &MarkupDom, id: NodeId, tag: &str) -> Result<Vec<Content>> {
        let kind = if tag.is_empty() { NO_TAG } else { tag };
        let children = self.children_of(dom, id)?;
        Ok(wrap(
            Container::new(kind).with_class(dom.get_attr(id, "class")),
            children,
        ))
    }

    /// Arrow, the erhua form itself, and its reading in both notations when
    /// the reading element follows (`<x-hwp/> <x-pr/>`).
    fn erhua(&mut self, dom: &MarkupDom, id: NodeId, tag: &str) -> Result<Vec<Content>> {
        let form = self.generic(dom, id, tag)?;
        if form.is_empty() {
            return Ok(vec![]);
        }

        let mut out = vec![Content::text(ERHUA_ARROW)];
        out.extend(form);

        let paired = dom
            .next_sibling(id)
            .and_then(|next| dom.next_sibling(next))
            .filter(|&next| dom.is_tag(next, READING_TAG));
        if let Some(reading_id) = paired {
            let pinyin = dom.flat_text(reading_id);
            let zhuyin = secondary_reading(&normalize_reading(&pinyin), self.transliterator());
            let reading = Container::new(READING_TAG)
                .with_class(dom.get_attr(reading_id, "class"))
                .with_content(vec![
                    Content::Container(
                        Container::new(marker::READING_PINYIN)
                            .with_content(vec![Content::Text(pinyin)]),
                    ),
                    Content::Container(
                        Container::new(marker::READING_ZHUYIN)
                            .with_content(vec![Content::Text(zhuyin)]),
                    ),
                ]);
            out.push(Content::Container(reading));
        }

        Ok(out)
    }

    fn image(&mut self, dom: &MarkupDom, id: NodeId) -> Result<Option<Content>> {
        let Some(src) = dom.get_attr(id, "src").filter(|s| !s.is_empty()) else {
            self.missing_image_sources += 1;
            debug!("Skipping image without src");
            return Ok(None);
        };

        let hash = format!("{:x}", Sha256::digest(src.as_bytes()));
        let path = image_path(&hash);

        if self.persisted.insert(hash.clone()) {
            let bytes = decode_image_source(src).map_err(|source| Error::InvalidImageData {
                hash: hash.clone(),
                source,
            })?;
            self.pending.push(ImageAsset {
                hash,
                path: path.clone(),
                bytes: Arc::new(bytes),
            });
        }

        Ok(Some(Content::Image(Image { path })))
    }
}

/// Wrap non-empty children in `container`; nothing otherwise.
fn wrap(container: Container, children: Vec<Content>) -> Vec<Content> {
    if children.is_empty() {
        vec![]
    } else {
        vec![Content::Container(container.with_content(children))]
    }
}

/// Bytes of an image source: the payload of a base64 `data:` URI, or the
/// source string itself.
pub fn decode_image_source(src: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    match data_uri_payload(src) {
        Some(payload) => {
            let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
            DATA_URI_ENGINE.decode(compact)
        }
        None => Ok(src.as_bytes().to_vec()),
    }
}

fn data_uri_payload(src: &str) -> Option<&str> {
    let rest = src.strip_prefix("data:")?;
    let (_media_type, payload) = rest.split_once(";base64,")?;
    Some(payload)
}
