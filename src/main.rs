//! cidian - MDict dump to pinyin and zhuyin Yomitan dictionaries

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cidian::lexicon::{MemoryLexicon, Notation, YomitanArchive};
use cidian::{ConvertConfig, Converter, RunReport, read_entries};

#[derive(Parser)]
#[command(name = "cidian")]
#[command(version, about = "MDict dump to Yomitan dictionary converter", long_about = None)]
#[command(after_help = "EXAMPLES:
    cidian guifan.txt -o out                  Write out/Guifan [Pinyin].zip and [Zhuyin].zip
    cidian guifan.txt -o out --title 规范     Name the dictionaries
    cidian guifan.txt --dry-run               Convert in memory and print the report")]
struct Cli {
    /// Entry dump (MDict text export)
    #[arg(value_name = "ENTRIES")]
    entries: PathBuf,

    /// Directory for the two archives
    #[arg(short, long, value_name = "DIR", required_unless_present = "dry_run")]
    out_dir: Option<PathBuf>,

    /// Dictionary title
    #[arg(short, long)]
    title: Option<String>,

    /// Dictionary revision
    #[arg(short, long)]
    revision: Option<String>,

    /// Stylesheet to include (repeatable, concatenated in order)
    #[arg(long, value_name = "FILE")]
    css: Vec<PathBuf>,

    /// JSON config file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Convert in memory only and print the report
    #[arg(long)]
    dry_run: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(if cli.quiet { "error" } else { &cli.log_level });

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Console logging; `RUST_LOG` overrides `level`.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli).await?;

    let entries = read_entries(&cli.entries)
        .with_context(|| format!("Failed to read entries from {}", cli.entries.display()))?;
    info!(path = %cli.entries.display(), entries = entries.len(), "Read entries");

    let converter = Converter::new(config);
    let report = match &cli.out_dir {
        Some(dir) if !cli.dry_run => convert_to_archives(&converter, &entries, dir).await?,
        _ => {
            let (mut pinyin, mut zhuyin) = (MemoryLexicon::new(), MemoryLexicon::new());
            converter.convert(&entries, &mut pinyin, &mut zhuyin).await?
        }
    };

    if !cli.quiet {
        println!("{report}");
    }
    Ok(())
}

async fn load_config(cli: &Cli) -> Result<ConvertConfig> {
    let mut config = match &cli.config {
        Some(path) => ConvertConfig::load(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ConvertConfig::default(),
    };
    if let Some(title) = &cli.title {
        config = config.with_title(title);
    }
    if let Some(revision) = &cli.revision {
        config = config.with_revision(revision);
    }
    config = config.with_stylesheets(cli.css.iter().cloned());
    config.validate()?;
    Ok(config)
}

async fn convert_to_archives(
    converter: &Converter,
    entries: &[cidian::RawEntry],
    dir: &Path,
) -> Result<RunReport> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let config = converter.config();
    let open = |notation: Notation| {
        let title = notation.lexicon_title(&config.title);
        let path = dir.join(format!("{title}.zip"));
        info!(path = %path.display(), "Writing archive");
        YomitanArchive::create(&path, config.archive_index(title))
            .with_context(|| format!("Failed to create {}", path.display()))
    };
    let mut pinyin = open(Notation::Pinyin)?;
    let mut zhuyin = open(Notation::Zhuyin)?;

    let report = converter.convert(entries, &mut pinyin, &mut zhuyin).await?;
    pinyin.finish().context("Failed to finish pinyin archive")?;
    zhuyin.finish().context("Failed to finish zhuyin archive")?;
    Ok(report)
}
