//! # cidian
//!
//! Converts an MDict text dump of a Chinese dictionary into two Yomitan
//! dictionaries: one keyed by pinyin readings, one by zhuyin.
//!
//! ## Pipeline
//!
//! - [`entry`] splits the dump into `(headword, markup)` entries
//! - [`section`] splits an entry into senses at each divider
//! - [`transpile`] turns section markup into [structured content](content)
//! - [`reading`] and [`zhuyin`] derive the reading in both notations
//! - [`resolver`] re-attaches forwarding entries (`@@@LINK=`) to their targets
//! - [`pipeline`] drives the above and feeds both [lexicons](lexicon)
//!
//! ## Quick Start
//!
//! ```no_run
//! use cidian::lexicon::{ArchiveIndex, Notation, YomitanArchive};
//! use cidian::{ConvertConfig, Converter, read_entries};
//!
//! # #[tokio::main]
//! # async fn main() -> cidian::Result<()> {
//! let entries = read_entries("guifan.txt")?;
//! let config = ConvertConfig::default().with_title("规范");
//!
//! let mut pinyin = YomitanArchive::create(
//!     "规范 [Pinyin].zip",
//!     config.archive_index(Notation::Pinyin.lexicon_title(&config.title)),
//! )?;
//! let mut zhuyin = YomitanArchive::create(
//!     "规范 [Zhuyin].zip",
//!     config.archive_index(Notation::Zhuyin.lexicon_title(&config.title)),
//! )?;
//!
//! let report = Converter::new(config)
//!     .convert(&entries, &mut pinyin, &mut zhuyin)
//!     .await?;
//! pinyin.finish()?;
//! zhuyin.finish()?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod content;
pub mod entry;
pub mod error;
pub mod lexicon;
pub mod markup;
pub mod pipeline;
pub mod reading;
pub mod resolver;
pub mod section;
pub mod transpile;
pub mod zhuyin;

pub use config::ConvertConfig;
pub use content::{Content, Definition};
pub use entry::{RawEntry, read_entries, split_entries};
pub use error::{Error, Result};
pub use lexicon::{Lexicon, MemoryLexicon, Notation, Term, YomitanArchive};
pub use pipeline::{Converter, RunReport};
pub use zhuyin::{Transliterator, Zhuyin};
