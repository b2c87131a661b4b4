//! Conversion settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::error::{Error, Result};
use crate::lexicon::ArchiveIndex;
use crate::section::SectionLayout;

/// Settings for one conversion run.
///
/// Every field has a default, so a config file only needs the values it
/// changes:
///
/// ```json
/// { "title": "现代汉语规范词典", "revision": "2", "stylesheets": ["guifan.css"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Dictionary title; the archives are named `<title> [Pinyin].zip` and
    /// `<title> [Zhuyin].zip`.
    pub title: String,
    pub revision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Class of the element holding an entry's sections.
    pub section_container_class: String,
    /// Tag separating sections.
    pub divider_tag: String,
    /// Log progress every this many entries.
    pub progress_interval: usize,
    /// CSS files concatenated into each archive's `styles.css`.
    pub stylesheets: Vec<PathBuf>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        let layout = SectionLayout::default();
        Self {
            title: "Guifan".to_string(),
            revision: "1".to_string(),
            author: None,
            description: None,
            source_url: None,
            section_container_class: layout.container_class,
            divider_tag: layout.divider,
            progress_interval: 10_000,
            stylesheets: Vec::new(),
        }
    }
}

impl ConvertConfig {
    /// Read a JSON config file.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Config("title must not be empty".into()));
        }
        if self.section_container_class.trim().is_empty() {
            return Err(Error::Config(
                "section_container_class must not be empty".into(),
            ));
        }
        if self.divider_tag.trim().is_empty() {
            return Err(Error::Config("divider_tag must not be empty".into()));
        }
        if self.progress_interval == 0 {
            return Err(Error::Config("progress_interval must be positive".into()));
        }
        Ok(())
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Append stylesheets after any already configured.
    pub fn with_stylesheets(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.stylesheets.extend(paths);
        self
    }

    pub fn layout(&self) -> SectionLayout {
        SectionLayout {
            container_class: self.section_container_class.clone(),
            divider: self.divider_tag.clone(),
        }
    }

    /// Archive metadata for the lexicon named `title`.
    pub fn archive_index(&self, title: String) -> ArchiveIndex {
        ArchiveIndex::new(title, self.revision.clone())
            .with_author(self.author.clone())
            .with_url(self.source_url.clone())
            .with_description(self.description.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[tokio::test]
    async fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"title": "规范", "divider_tag": "hr", "stylesheets": ["a.css"]}}"#
        )
        .unwrap();

        let config = ConvertConfig::load(file.path()).await.unwrap();
        assert_eq!(config.title, "规范");
        assert_eq!(config.section_container_class, "HYGF2");
        assert_eq!(config.progress_interval, 10_000);
        assert_eq!(config.stylesheets, vec![PathBuf::from("a.css")]);
    }

    #[tokio::test]
    async fn test_unknown_field_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"titel": "typo"}}"#).unwrap();
        assert!(matches!(
            ConvertConfig::load(file.path()).await,
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_validate() {
        assert!(ConvertConfig::default().validate().is_ok());
        assert!(
            ConvertConfig::default()
                .with_progress_interval(0)
                .validate()
                .is_err()
        );
        assert!(ConvertConfig::default().with_title(" ").validate().is_err());
    }

    #[test]
    fn test_archive_index() {
        let config = ConvertConfig {
            source_url: Some("https://example.org".into()),
            ..ConvertConfig::default()
        }
        .with_revision("3");
        let index = config.archive_index("t [Pinyin]".into());
        assert_eq!(index.revision, "3");
        assert_eq!(index.url.as_deref(), Some("https://example.org"));
        assert_eq!(index.format, 3);
    }
}
