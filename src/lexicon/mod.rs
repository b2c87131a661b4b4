//! Output lexicons.
//!
//! A conversion writes to two lexicons at once, one keyed by pinyin and one
//! by zhuyin. Both implement [`Lexicon`], an additive sink for files
//! (images, stylesheets) and term records.
//!
//! - [`YomitanArchive`] writes a Yomitan dictionary zip
//! - [`MemoryLexicon`] keeps everything in memory, for tests and dry runs

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::content::Definition;
use crate::error::Result;

mod memory;
mod yomitan;

pub use memory::MemoryLexicon;
pub use yomitan::{ArchiveIndex, TERMS_PER_BANK, YomitanArchive};

/// Archive path of the merged stylesheet.
pub const STYLESHEET_PATH: &str = "styles.css";

/// One term record: a headword, its reading in the lexicon's notation, and
/// a definition that may be shared with other records.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub headword: String,
    pub reading: String,
    pub definition: Arc<Definition>,
}

impl Term {
    pub fn new(
        headword: impl Into<String>,
        reading: impl Into<String>,
        definition: Arc<Definition>,
    ) -> Self {
        Self {
            headword: headword.into(),
            reading: reading.into(),
            definition,
        }
    }
}

/// Reading notation a lexicon is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notation {
    Pinyin,
    Zhuyin,
}

impl Notation {
    pub fn label(self) -> &'static str {
        match self {
            Notation::Pinyin => "Pinyin",
            Notation::Zhuyin => "Zhuyin",
        }
    }

    /// Lexicon title for a dictionary called `title`, e.g. `规范 [Pinyin]`.
    pub fn lexicon_title(self, title: &str) -> String {
        format!("{title} [{}]", self.label())
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An additive sink for lexicon content.
///
/// Files are keyed by archive path. Terms are kept in submission order.
///
/// The converter drives both lexicons of a run with `tokio::try_join!`; how
/// much of that actually overlaps is up to the implementation. A lexicon
/// that writes synchronously inside these methods (as [`YomitanArchive`]
/// does) runs to completion before the other one is polled.
#[async_trait]
pub trait Lexicon: Send {
    /// Store a file (image, stylesheet) at `path`.
    async fn add_file(&mut self, path: &str, bytes: Arc<Vec<u8>>) -> Result<()>;

    /// Add a term record.
    async fn add_term(&mut self, term: Term) -> Result<()>;
}
