//! The conversion pipeline.
//!
//! Entries are processed one at a time, in input order:
//!
//! 1. forwarding entries (`@@@LINK=`) are recorded and emit nothing yet
//! 2. other entries are parsed, split into sections and transpiled
//! 3. each section is emitted as a term pair, one term per lexicon, both
//!    sharing the section's definition
//!
//! Both lexicons receive an entry's images and terms concurrently; the next
//! entry starts once both are done. After the last entry, forwarding
//! entries are resolved against the sections recorded as link targets.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, error, info};

use crate::config::ConvertConfig;
use crate::content::Definition;
use crate::entry::RawEntry;
use crate::error::Result;
use crate::lexicon::{Lexicon, STYLESHEET_PATH, Term};
use crate::markup::parse_markup;
use crate::reading::Reading;
use crate::resolver::{LinkResolver, UnresolvedLink, parse_link_directive};
use crate::section::{DefinitionSection, SectionLayout, build_section, split_sections};
use crate::transpile::{ImageAsset, Transpiler};
use crate::zhuyin::{Transliterator, Zhuyin};

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Entries read, forwarding entries included.
    pub entries: usize,
    /// Forwarding entries.
    pub forwarding: usize,
    /// Term pairs emitted from sections.
    pub terms: usize,
    /// Term pairs emitted for resolved forwarding entries.
    pub linked_terms: usize,
    /// Forwarding entries whose target was never found.
    pub unresolved: Vec<UnresolvedLink>,
    /// Distinct images persisted.
    pub images: usize,
    /// Image elements without a source.
    pub missing_image_sources: usize,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Entries:     {} ({} forwarding)",
            self.entries, self.forwarding
        )?;
        writeln!(
            f,
            "Terms:       {} (+{} linked)",
            self.terms, self.linked_terms
        )?;
        writeln!(
            f,
            "Images:      {} ({} without source)",
            self.images, self.missing_image_sources
        )?;
        write!(f, "Unresolved:  {}", self.unresolved.len())?;
        for link in &self.unresolved {
            write!(f, "\n  {link}")?;
        }
        Ok(())
    }
}

/// Converts entries into a pair of lexicons.
///
/// # Example
///
/// ```
/// use cidian::entry::RawEntry;
/// use cidian::lexicon::MemoryLexicon;
/// use cidian::{ConvertConfig, Converter};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> cidian::Result<()> {
/// let entries = vec![RawEntry::new("阿", r#"<div class="HYGF2"><x-hw>阿</x-hw><x-pr>ā</x-pr></div>"#)];
/// let (mut pinyin, mut zhuyin) = (MemoryLexicon::new(), MemoryLexicon::new());
///
/// let report = Converter::new(ConvertConfig::default())
///     .convert(&entries, &mut pinyin, &mut zhuyin)
///     .await?;
///
/// assert_eq!(report.terms, 1);
/// assert_eq!(zhuyin.terms()[0].reading, "ㄚ");
/// # Ok(())
/// # }
/// ```
pub struct Converter {
    config: ConvertConfig,
    transliterator: Arc<dyn Transliterator>,
}

impl Converter {
    pub fn new(config: ConvertConfig) -> Self {
        Self {
            config,
            transliterator: Arc::new(Zhuyin),
        }
    }

    /// Use a different secondary notation.
    pub fn with_transliterator(mut self, transliterator: Arc<dyn Transliterator>) -> Self {
        self.transliterator = transliterator;
        self
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Run the whole conversion: stylesheets, the main pass over
    /// `entries`, then cross-reference resolution.
    ///
    /// `primary` receives pinyin readings, `secondary` the transliterated
    /// ones. The first error aborts the run.
    pub async fn convert(
        &self,
        entries: &[RawEntry],
        primary: &mut dyn Lexicon,
        secondary: &mut dyn Lexicon,
    ) -> Result<RunReport> {
        let layout = self.config.layout();
        let interval = self.config.progress_interval.max(1);
        let mut transpiler = Transpiler::new(Arc::clone(&self.transliterator));
        let mut resolver = LinkResolver::new();
        let mut report = RunReport::default();

        if let Some(css) = merge_stylesheets(&self.config.stylesheets).await? {
            let css = Arc::new(css.into_bytes());
            tokio::try_join!(
                primary.add_file(STYLESHEET_PATH, Arc::clone(&css)),
                secondary.add_file(STYLESHEET_PATH, css),
            )?;
        }

        info!(entries = entries.len(), "Converting entries");
        for entry in entries {
            if let Some(target) = parse_link_directive(&entry.markup) {
                debug!(headword = %entry.headword, %target, "Deferring forwarding entry");
                resolver.record_forwarding(&entry.headword, target);
                report.forwarding += 1;
            } else {
                let sections = convert_entry(entry, &layout, &mut transpiler).inspect_err(|e| {
                    error!(headword = %entry.headword, "Failed to convert entry: {e}")
                })?;
                let images = transpiler.take_images();

                let mut pair = TermPair::default();
                for section in &sections {
                    resolver.record_section(&entry.headword, section);
                    pair.push(&entry.headword, &section.reading, &section.definition);
                }

                report.terms += sections.len();
                report.images += images.len();
                pair.submit(&images, primary, secondary).await?;
            }

            report.entries += 1;
            if report.entries % interval == 0 {
                info!("Processed {} entries", report.entries);
            }
        }
        report.missing_image_sources = transpiler.missing_image_sources();
        info!(
            entries = report.entries,
            terms = report.terms,
            images = report.images,
            "Main pass complete"
        );

        info!(
            pending = resolver.pending_len(),
            targets = resolver.source_len(),
            "Resolving cross-references"
        );
        let resolution = resolver.resolve(self.transliterator.as_ref());
        for link in &resolution.linked {
            let mut pair = TermPair::default();
            pair.push(&link.headword, &link.reading, &link.definition);
            pair.submit(&[], primary, secondary).await?;
            report.linked_terms += 1;
        }
        report.unresolved = resolution.unresolved;
        info!(
            linked = report.linked_terms,
            unresolved = report.unresolved.len(),
            "Processed linked terms"
        );

        Ok(report)
    }
}

/// Parse one entry and build its sections.
fn convert_entry(
    entry: &RawEntry,
    layout: &SectionLayout,
    transpiler: &mut Transpiler,
) -> Result<Vec<DefinitionSection>> {
    let dom = parse_markup(&entry.markup);
    split_sections(&dom, layout)
        .into_iter()
        .map(|nodes| build_section(&dom, nodes, transpiler))
        .collect()
}

/// Terms for both lexicons, in matching order.
#[derive(Default)]
struct TermPair {
    primary: Vec<Term>,
    secondary: Vec<Term>,
}

impl TermPair {
    fn push(&mut self, headword: &str, reading: &Reading, definition: &Arc<Definition>) {
        self.primary
            .push(Term::new(headword, &reading.primary, Arc::clone(definition)));
        self.secondary
            .push(Term::new(headword, &reading.secondary, Arc::clone(definition)));
    }

    /// Hand images and terms to both lexicons, joined. Overlap depends on
    /// whether the lexicons yield.
    async fn submit(
        self,
        images: &[ImageAsset],
        primary: &mut dyn Lexicon,
        secondary: &mut dyn Lexicon,
    ) -> Result<()> {
        tokio::try_join!(
            submit_batch(primary, images, self.primary),
            submit_batch(secondary, images, self.secondary),
        )?;
        Ok(())
    }
}

async fn submit_batch(
    lexicon: &mut dyn Lexicon,
    images: &[ImageAsset],
    terms: Vec<Term>,
) -> Result<()> {
    for image in images {
        lexicon.add_file(&image.path, Arc::clone(&image.bytes)).await?;
    }
    for term in terms {
        lexicon.add_term(term).await?;
    }
    Ok(())
}

/// Concatenate stylesheets in order. `None` when there are none.
pub async fn merge_stylesheets(paths: &[PathBuf]) -> Result<Option<String>> {
    if paths.is_empty() {
        return Ok(None);
    }
    let mut merged = String::new();
    for path in paths {
        let css = fs::read_to_string(path).await?;
        debug!(path = %path.display(), bytes = css.len(), "Merging stylesheet");
        merged.push_str(&css);
        if !merged.ends_with('\n') {
            merged.push('\n');
        }
    }
    Ok(Some(merged))
}
