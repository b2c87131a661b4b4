//! Yomitan dictionary archive writer.
//!
//! Layout of the zip:
//!
//! - `index.json`: dictionary metadata, format 3
//! - `term_bank_N.json`: term rows, [`TERMS_PER_BANK`] per file
//! - image files at their archive path, and an optional `styles.css`
//!
//! Term rows follow the v3 term-bank schema:
//! `[term, reading, defTags, rules, score, [definition], sequence, termTags]`.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::{Lexicon, Term};
use crate::content::Definition;
use crate::error::Result;

/// Term rows per `term_bank_N.json`.
pub const TERMS_PER_BANK: usize = 10_000;

const INDEX_PATH: &str = "index.json";
const FORMAT: u8 = 3;

/// Contents of `index.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveIndex {
    pub title: String,
    pub revision: String,
    pub sequenced: bool,
    pub format: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ArchiveIndex {
    pub fn new(title: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            revision: revision.into(),
            sequenced: true,
            format: FORMAT,
            author: None,
            url: None,
            description: None,
        }
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

/// One v3 term-bank row.
type TermRow<'a> = (&'a str, &'a str, &'a str, &'a str, i64, [&'a Definition; 1], u64, &'a str);

/// A Yomitan archive being written.
///
/// Terms are buffered until a bank fills up. Call [`finish`](Self::finish)
/// to flush the last bank and write `index.json`; dropping the archive
/// without finishing leaves an incomplete zip.
///
/// Writes happen synchronously inside the [`Lexicon`] methods, which never
/// yield.
///
/// # Example
///
/// ```no_run
/// use cidian::lexicon::{ArchiveIndex, YomitanArchive};
///
/// let archive = YomitanArchive::create("out.zip", ArchiveIndex::new("规范", "1"))?;
/// archive.finish()?;
/// # Ok::<(), cidian::Error>(())
/// ```
pub struct YomitanArchive<W: Write + Seek> {
    zip: ZipWriter<W>,
    index: ArchiveIndex,
    bank_size: usize,
    /// Buffered rows of the current bank with their sequence numbers.
    bank: Vec<(u64, Term)>,
    banks_written: usize,
    sequence: u64,
    paths: HashSet<String>,
}

impl YomitanArchive<BufWriter<File>> {
    /// Create the archive file at `path`.
    pub fn create(path: impl AsRef<Path>, index: ArchiveIndex) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file), index))
    }
}

impl<W: Write + Seek> YomitanArchive<W> {
    pub fn new(writer: W, index: ArchiveIndex) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            index,
            bank_size: TERMS_PER_BANK,
            bank: Vec::new(),
            banks_written: 0,
            sequence: 0,
            paths: HashSet::new(),
        }
    }

    /// Override the number of rows per term bank.
    pub fn with_bank_size(mut self, bank_size: usize) -> Self {
        self.bank_size = bank_size.max(1);
        self
    }

    /// Terms added so far.
    pub fn term_count(&self) -> u64 {
        self.sequence
    }

    /// Flush the last bank, write `index.json` and close the zip.
    pub fn finish(mut self) -> Result<W> {
        self.flush_bank()?;
        let index = serde_json::to_vec(&self.index)?;
        self.write_entry(INDEX_PATH, &index)?;
        debug!(
            title = %self.index.title,
            terms = self.sequence,
            banks = self.banks_written,
            "Finished archive"
        );
        Ok(self.zip.finish()?)
    }

    fn flush_bank(&mut self) -> Result<()> {
        if self.bank.is_empty() {
            return Ok(());
        }
        let rows: Vec<TermRow<'_>> = self
            .bank
            .iter()
            .map(|(sequence, term)| {
                (
                    term.headword.as_str(),
                    term.reading.as_str(),
                    "",
                    "",
                    0,
                    [term.definition.as_ref()],
                    *sequence,
                    "",
                )
            })
            .collect();
        let json = serde_json::to_vec(&rows)?;

        self.banks_written += 1;
        let path = format!("term_bank_{}.json", self.banks_written);
        self.write_entry(&path, &json)?;
        self.bank.clear();
        Ok(())
    }

    fn write_entry(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        self.zip.start_file(path, options_for(path))?;
        self.zip.write_all(bytes)?;
        Ok(())
    }
}

/// Text is deflated; images are already compressed and stored as is.
fn options_for(path: &str) -> SimpleFileOptions {
    if path.ends_with(".json") || path.ends_with(".css") {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(6))
    } else {
        SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
    }
}

#[async_trait]
impl<W: Write + Seek + Send> Lexicon for YomitanArchive<W> {
    async fn add_file(&mut self, path: &str, bytes: Arc<Vec<u8>>) -> Result<()> {
        if !self.paths.insert(path.to_string()) {
            debug!(path, "Skipping duplicate archive file");
            return Ok(());
        }
        self.write_entry(path, &bytes)
    }

    async fn add_term(&mut self, term: Term) -> Result<()> {
        self.sequence += 1;
        self.bank.push((self.sequence, term));
        if self.bank.len() >= self.bank_size {
            self.flush_bank()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use serde_json::{Value, json};
    use zip::ZipArchive;

    use super::*;
    use crate::content::Content;

    fn read_json(zip: &mut ZipArchive<Cursor<Vec<u8>>>, path: &str) -> Value {
        let mut text = String::new();
        zip.by_name(path).unwrap().read_to_string(&mut text).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[tokio::test]
    async fn test_archive_layout() {
        let index = ArchiveIndex::new("规范 [Pinyin]", "2024-01")
            .with_author(Some("someone".into()))
            .with_url(None);
        let mut archive = YomitanArchive::new(Cursor::new(Vec::new()), index).with_bank_size(2);

        let definition = Arc::new(Definition::new(Content::text("释义")));
        for (headword, reading) in [("阿", "ā"), ("啊", "a"), ("爱", "ài")] {
            archive
                .add_term(Term::new(headword, reading, Arc::clone(&definition)))
                .await
                .unwrap();
        }
        let image = Arc::new(b"\x89PNG".to_vec());
        archive.add_file("img/x.png", Arc::clone(&image)).await.unwrap();
        archive.add_file("img/x.png", image).await.unwrap();
        assert_eq!(archive.term_count(), 3);

        let bytes = archive.finish().unwrap().into_inner();
        let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();

        let index = read_json(&mut zip, "index.json");
        assert_eq!(index["title"], "规范 [Pinyin]");
        assert_eq!(index["format"], 3);
        assert_eq!(index["author"], "someone");
        assert!(index.get("url").is_none());

        let first = read_json(&mut zip, "term_bank_1.json");
        assert_eq!(first.as_array().unwrap().len(), 2);
        assert_eq!(
            first[0],
            json!([
                "阿", "ā", "", "", 0,
                [{"type": "structured-content", "content": "释义"}],
                1, ""
            ])
        );
        let second = read_json(&mut zip, "term_bank_2.json");
        assert_eq!(second[0][0], "爱");
        assert_eq!(second[0][6], 3);
        assert!(zip.by_name("term_bank_3.json").is_err());

        let mut png = Vec::new();
        zip.by_name("img/x.png").unwrap().read_to_end(&mut png).unwrap();
        assert_eq!(png, b"\x89PNG");
    }

    #[test]
    fn test_empty_archive_has_index_only() {
        let archive = YomitanArchive::new(Cursor::new(Vec::new()), ArchiveIndex::new("t", "1"));
        let bytes = archive.finish().unwrap().into_inner();
        let zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(zip.len(), 1);
    }
}
