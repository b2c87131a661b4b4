//! Structured content: the rich-text tree stored as a definition body.
//!
//! Serializes to the Yomitan structured-content JSON schema. Trees are
//! immutable once built and are shared between the pinyin and zhuyin term
//! of a section through [`Arc<Definition>`](std::sync::Arc).

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::markup::vocabulary::DATA_KEY;

/// Relative image height, in `em`.
pub const IMAGE_HEIGHT_EM: f64 = 1.2;

/// A structured-content node.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Container(Container),
    Link(Link),
    Image(Image),
}

/// A `span` with children, metadata and an optional language.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Container {
    pub content: Vec<Content>,
    pub data: BTreeMap<String, String>,
    pub lang: Option<String>,
}

/// A link that searches the dictionary for `query`.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub href: String,
    pub content: Vec<Content>,
}

/// An archived image, referenced by path.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub path: String,
}

impl Container {
    /// A container whose metadata kind is `kind`.
    pub fn new(kind: impl Into<String>) -> Self {
        let mut data = BTreeMap::new();
        data.insert(DATA_KEY.to_string(), kind.into());
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: Vec<Content>) -> Self {
        self.content = content;
        self
    }

    pub fn with_class(mut self, class: Option<&str>) -> Self {
        if let Some(class) = class {
            self.data.insert("class".to_string(), class.to_string());
        }
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// The metadata kind (source tag name or synthesized marker).
    pub fn kind(&self) -> Option<&str> {
        self.data.get(DATA_KEY).map(String::as_str)
    }
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text(text.into())
    }

    /// Direct children, empty for leaves.
    pub fn children(&self) -> &[Content] {
        match self {
            Content::Container(c) => &c.content,
            Content::Link(l) => &l.content,
            Content::Text(_) | Content::Image(_) => &[],
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Content::Container(c) => Some(c),
            _ => None,
        }
    }

    /// First node in document order (self included) matching `predicate`.
    pub fn find<F>(&self, predicate: F) -> Option<&Content>
    where
        F: Fn(&Content) -> bool + Copy,
    {
        if predicate(self) {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(predicate))
    }

    /// First container whose metadata kind is `kind`.
    pub fn find_kind(&self, kind: &str) -> Option<&Container> {
        self.find(|c| c.as_container().and_then(Container::kind) == Some(kind))
            .and_then(Content::as_container)
    }

    /// Concatenated text of all descendant text nodes.
    pub fn flat_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Content::Text(t) => out.push_str(t),
            _ => self.children().iter().for_each(|c| c.collect_text(out)),
        }
    }
}

impl Serialize for Content {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Content::Text(text) => serializer.serialize_str(text),
            Content::Container(c) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("tag", "span")?;
                map.serialize_entry("content", &c.content)?;
                if !c.data.is_empty() {
                    map.serialize_entry("data", &c.data)?;
                }
                if let Some(lang) = &c.lang {
                    map.serialize_entry("lang", lang)?;
                }
                map.end()
            }
            Content::Link(l) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("tag", "a")?;
                map.serialize_entry("href", &l.href)?;
                map.serialize_entry("content", &l.content)?;
                map.end()
            }
            Content::Image(i) => {
                let mut map = serializer.serialize_map(Some(6))?;
                map.serialize_entry("tag", "img")?;
                map.serialize_entry("path", &i.path)?;
                map.serialize_entry("collapsed", &false)?;
                map.serialize_entry("collapsible", &false)?;
                map.serialize_entry("height", &IMAGE_HEIGHT_EM)?;
                map.serialize_entry("sizeUnits", "em")?;
                map.end()
            }
        }
    }
}

/// A definition body as stored in a term bank.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub content: Content,
}

impl Definition {
    pub fn new(content: Content) -> Self {
        Self { content }
    }
}

impl Serialize for Definition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", "structured-content")?;
        map.serialize_entry("content", &self.content)?;
        map.end()
    }
}
