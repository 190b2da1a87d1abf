//! vbkm - inspect, validate, convert and merge virtual bookmark files
//!
//! Usage: vbkm [--settings <FILE>] <COMMAND>
//!
//! Commands:
//!   show     Print the bookmark tree with page ranges
//!   check    Validate a bookmark file
//!   convert  Rewrite a bookmark file in another format
//!   merge    Combine bookmark files, one document per input

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use toc_edit::TocEditor;
use toc_model::export::ExportFilter;
use toc_model::{display_label, TocTree};
use toc_store::{
    load_bookmarks, save_bookmarks_as, BookmarkFileOpener, EditorSettings, FileFormat,
    SettingsManager,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// vbkm - virtual bookmark tool
#[derive(Parser, Debug)]
#[command(name = "vbkm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (JSON); defaults are used when absent
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the bookmark tree with page ranges
    Show {
        /// Bookmark file (.vbkm or .json)
        file: PathBuf,
    },

    /// Validate a bookmark file
    Check {
        /// Bookmark file (.vbkm or .json)
        file: PathBuf,
    },

    /// Rewrite a bookmark file in another format
    Convert {
        input: PathBuf,
        output: PathBuf,

        /// Output format; taken from the output extension when omitted
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Leave out unchecked bookmarks
        #[arg(long)]
        checked_only: bool,
    },

    /// Combine bookmark files, one document per input
    Merge {
        /// Files to combine, in order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Vbkm,
    Json,
}

impl From<FormatArg> for FileFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Vbkm => FileFormat::Vbkm,
            FormatArg::Json => FileFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_deref())?;

    match cli.command {
        Commands::Show { file } => {
            let tree = load(&file)?;
            print!("{}", render(&tree)?);
        }
        Commands::Check { file } => {
            let tree = load(&file)?;
            println!("{}", check(&tree)?);
        }
        Commands::Convert {
            input,
            output,
            format,
            checked_only,
        } => {
            let tree = load(&input)?;
            let format = format
                .map(FileFormat::from)
                .or_else(|| FileFormat::detect(&output))
                .unwrap_or(settings.export.default_format);
            let filter = if checked_only {
                ExportFilter::CheckedOnly
            } else {
                settings.export.filter()
            };
            save_bookmarks_as(&tree, &output, format, filter)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            tracing::info!(input = %input.display(), output = %output.display(), ?format, "converted");
        }
        Commands::Merge { inputs, output } => {
            let tree = merge(&inputs, &settings)?;
            let format = FileFormat::detect(&output).unwrap_or(settings.export.default_format);
            save_bookmarks_as(&tree, &output, format, settings.export.filter())
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Merged {} files into {}", inputs.len(), output.display());
        }
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<EditorSettings> {
    let Some(path) = path else {
        return Ok(EditorSettings::default());
    };
    let mut manager = SettingsManager::with_path(path);
    let settings = manager
        .load_sync()
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;
    Ok(settings.clone())
}

fn load(path: &Path) -> Result<TocTree> {
    load_bookmarks(path).with_context(|| format!("Failed to load {}", path.display()))
}

/// One line per bookmark, indented by depth
fn render(tree: &TocTree) -> Result<String> {
    let mut out = String::new();
    for (id, depth) in tree.preorder() {
        let Some(item) = tree.get(id) else {
            continue;
        };
        let mark = if item.is_checked() { "[x]" } else { "[ ]" };
        writeln!(out, "{}{} {}", "  ".repeat(depth), mark, display_label(item))?;
    }
    Ok(out)
}

/// Verify the tree and summarize it
fn check(tree: &TocTree) -> Result<String> {
    tree.check_consistency().context("Bookmark tree is inconsistent")?;
    if tree.is_empty() {
        bail!("Bookmark file has no entries");
    }

    let documents = tree.items().filter(|item| item.is_document()).count();
    let unchecked = tree.items().filter(|item| !item.is_checked()).count();
    let depth = tree.preorder().into_iter().map(|(_, depth)| depth + 1).max().unwrap_or(0);
    Ok(format!(
        "OK: {} bookmarks, {} documents, {} unchecked, depth {}",
        tree.len(),
        documents,
        unchecked,
        depth
    ))
}

/// Import every input as a document of a fresh tree
fn merge(inputs: &[PathBuf], settings: &EditorSettings) -> Result<TocTree> {
    let mut editor = TocEditor::with_tree(TocTree::new(), settings.editor.clone());
    for input in inputs {
        let outcome = editor
            .append_document(&BookmarkFileOpener, input)
            .with_context(|| format!("Failed to import {}", input.display()))?;
        if let Some(reason) = outcome.rejection() {
            bail!("Cannot import {}: {}", input.display(), reason);
        }
    }
    Ok(editor.into_tree())
}
