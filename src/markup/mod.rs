//! Entry markup parsing.
//!
//! Entry bodies are HTML-ish fragments with custom `x-*` tags. They are
//! parsed leniently with html5ever into a [`MarkupDom`].
//!
//! # Example
//!
//! ```
//! use cidian::markup::parse_markup;
//!
//! let dom = parse_markup(r#"<div class="HYGF2"><x-pr>ā</x-pr></div>"#);
//! let reading = dom.find_by_tag("x-pr").unwrap();
//! assert_eq!(dom.flat_text(reading), "ā");
//! ```

mod dom;
mod sink;
pub mod vocabulary;

pub use dom::{Attribute, ChildrenIter, MarkupData, MarkupDom, MarkupNode, NodeId, NodeKind};
pub use vocabulary::TagKind;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use sink::MarkupSink;

/// Parse one entry's markup.
pub fn parse_markup(markup: &str) -> MarkupDom {
    parse_document(MarkupSink::new(), ParseOpts::default())
        .from_utf8()
        .one(markup.as_bytes())
        .into_dom()
}
