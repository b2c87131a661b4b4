//! Entry splitting for MDict text dumps.
//!
//! A dump is a sequence of blocks, each terminated by the `</>` sentinel.
//! The first line of a block is the headword; the rest is the entry markup.

use std::borrow::Cow;
use std::path::Path;

use memchr::memmem;
use tracing::warn;

use crate::error::{Error, Result};

/// End-of-entry sentinel.
pub const ENTRY_SENTINEL: &str = "</>";

/// One `(headword, markup)` record of the dump, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub headword: String,
    pub markup: String,
}

impl RawEntry {
    pub fn new(headword: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            headword: headword.into(),
            markup: markup.into(),
        }
    }
}

/// Split a dump into entries.
///
/// Text after the last sentinel is not an entry and is dropped. A block
/// without both a headword and markup fails the whole split with
/// [`Error::MalformedEntry`].
///
/// # Examples
///
/// ```
/// use cidian::entry::split_entries;
///
/// let entries = split_entries("啊\n<p>a</p>\n</>\n吧\n<p>ba</p>\n</>\n").unwrap();
/// assert_eq!(entries.len(), 2);
/// assert_eq!(entries[1].headword, "吧");
/// assert_eq!(entries[1].markup, "<p>ba</p>");
/// ```
pub fn split_entries(content: &str) -> Result<Vec<RawEntry>> {
    let finder = memmem::Finder::new(ENTRY_SENTINEL);
    let mut entries = Vec::new();
    let mut start = 0;

    for end in finder.find_iter(content.as_bytes()) {
        entries.push(parse_block(&content[start..end])?);
        start = end + ENTRY_SENTINEL.len();
    }

    let rest = content[start..].trim();
    if !rest.is_empty() {
        warn!(len = rest.len(), "Ignoring unterminated trailing entry block");
    }

    Ok(entries)
}

fn parse_block(block: &str) -> Result<RawEntry> {
    let block = block.trim();
    let (headword, markup) = block.split_once('\n').unwrap_or((block, ""));
    let (headword, markup) = (headword.trim(), markup.trim());

    if headword.is_empty() || markup.is_empty() {
        return Err(Error::MalformedEntry {
            block: block.to_string(),
        });
    }

    Ok(RawEntry::new(headword, markup))
}

/// Read and split an entry dump from disk.
pub fn read_entries(path: impl AsRef<Path>) -> Result<Vec<RawEntry>> {
    let bytes = std::fs::read(path)?;
    split_entries(&decode_text(&bytes))
}

/// Decode dump bytes to a string.
///
/// A byte-order mark wins (MDict unpackers emit UTF-16LE for some
/// dictionaries). Without one, UTF-8 is tried before GB18030.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, _)) = encoding_rs::Encoding::for_bom(bytes) {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }

    let (result, _, _) = encoding_rs::GB18030.decode(bytes);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_preserves_order() {
        let dump = "B\n<p>b</p></>A\n<p>a</p></>C\n<p>c</p></>";
        let entries = split_entries(dump).unwrap();
        let headwords: Vec<_> = entries.iter().map(|e| e.headword.as_str()).collect();
        assert_eq!(headwords, ["B", "A", "C"]);
    }

    #[test]
    fn test_split_trims_halves() {
        let entries = split_entries("\r\n  阿姨  \n\n  <div>x</div>  \n</>").unwrap();
        assert_eq!(entries, vec![RawEntry::new("阿姨", "<div>x</div>")]);
    }

    #[test]
    fn test_markup_keeps_inner_newlines() {
        let entries = split_entries("词\n<div>\n<hr>\n</div>\n</>").unwrap();
        assert_eq!(entries[0].markup, "<div>\n<hr>\n</div>");
    }

    #[test]
    fn test_headword_without_markup_is_malformed() {
        let err = split_entries("ok\n<p/></>lonely\n</>").unwrap_err();
        match err {
            Error::MalformedEntry { block } => assert_eq!(block, "lonely"),
            other => panic!("expected MalformedEntry, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_block_is_malformed() {
        assert!(matches!(
            split_entries("a\n<p/></>\n  \n</>"),
            Err(Error::MalformedEntry { .. })
        ));
    }

    #[test]
    fn test_trailing_text_is_dropped() {
        let entries = split_entries("a\n<p/></>\ntrailing junk").unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_decode_utf8_bom() {
        let bytes = b"\xEF\xBB\xBFhello";
        assert_eq!(decode_text(bytes), "hello");
    }

    #[test]
    fn test_decode_utf16le_bom() {
        let bytes = [0xFF, 0xFE, b'h', 0, b'i', 0];
        assert_eq!(decode_text(&bytes), "hi");
    }

    #[test]
    fn test_decode_gb18030_fallback() {
        // "中" in GB18030
        let bytes = [0xD6, 0xD0];
        assert_eq!(decode_text(&bytes), "中");
    }
}
