use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::{Lexicon, Term};
use crate::error::Result;

/// A lexicon held in memory.
#[derive(Debug, Default)]
pub struct MemoryLexicon {
    terms: Vec<Term>,
    files: BTreeMap<String, Arc<Vec<u8>>>,
    file_writes: usize,
}

impl MemoryLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Terms in submission order.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Terms filed under `headword`.
    pub fn terms_for<'a>(&'a self, headword: &'a str) -> impl Iterator<Item = &'a Term> + 'a {
        self.terms.iter().filter(move |t| t.headword == headword)
    }

    pub fn file(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|b| b.as_slice())
    }

    pub fn file_paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Number of `add_file` calls, duplicates included.
    pub fn file_writes(&self) -> usize {
        self.file_writes
    }
}

#[async_trait]
impl Lexicon for MemoryLexicon {
    async fn add_file(&mut self, path: &str, bytes: Arc<Vec<u8>>) -> Result<()> {
        self.file_writes += 1;
        self.files.insert(path.to_string(), bytes);
        Ok(())
    }

    async fn add_term(&mut self, term: Term) -> Result<()> {
        self.terms.push(term);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Content, Definition};

    #[tokio::test]
    async fn test_memory_lexicon_collects() {
        let mut lexicon = MemoryLexicon::new();
        let definition = Arc::new(Definition::new(Content::text("x")));
        lexicon
            .add_term(Term::new("阿", "ā", Arc::clone(&definition)))
            .await
            .unwrap();
        lexicon
            .add_file("img/a.png", Arc::new(b"png".to_vec()))
            .await
            .unwrap();

        assert_eq!(lexicon.terms_for("阿").count(), 1);
        assert_eq!(lexicon.file("img/a.png"), Some(&b"png"[..]));
        assert_eq!(lexicon.file_writes(), 1);
    }
}
