use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

mod load;
mod output;

use citemap_core::{BlockSource, StructuredDocument};
use citemap_reporting::ExportFormat;
use output::ColorMode;

/// citemap - structure scholarly documents and resolve their citations
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Md,
    Json,
    Html,
}

impl From<Format> for ExportFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Md => ExportFormat::Markdown,
            Format::Json => ExportFormat::Json,
            Format::Html => ExportFormat::Html,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Structure a document and export sections, references, and citations
    Structure {
        /// Path to the pre-extracted text file
        file_path: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "md")]
        format: Format,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the resolved citation map
    Citations {
        /// Path to the pre-extracted text file
        file_path: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Export per-section extractive summaries
    Summarize {
        /// Path to the pre-extracted text file
        file_path: PathBuf,

        /// Sentences kept per section
        #[arg(long, default_value_t = citemap_summarize::DEFAULT_MAX_SENTENCES)]
        sentences: usize,

        /// Output format
        #[arg(long, value_enum, default_value = "md")]
        format: Format,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Structure {
            file_path,
            format,
            output,
        } => {
            let doc = structure_file(&file_path)?;
            let content = citemap_reporting::render(&doc, None, format.into())
                .context("rendering document")?;
            write_out(&content, output.as_deref())
        }
        Command::Citations {
            file_path,
            no_color,
        } => {
            let doc = structure_file(&file_path)?;
            let color = ColorMode(!no_color);
            let mut stdout = std::io::stdout();
            output::print_citation_map(&mut stdout, &doc, color)?;
            Ok(())
        }
        Command::Summarize {
            file_path,
            sentences,
            format,
            output,
        } => {
            let doc = structure_file(&file_path)?;
            let summary = citemap_summarize::summarize(&doc, sentences);
            let content = citemap_reporting::render(&doc, Some(&summary), format.into())
                .context("rendering summary")?;
            write_out(&content, output.as_deref())
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "citemap=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn structure_file(path: &std::path::Path) -> anyhow::Result<StructuredDocument> {
    let blocks = load::TextFileSource
        .extract_blocks(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    tracing::debug!(blocks = blocks.len(), path = %path.display(), "loaded block stream");
    let doc = citemap_parsing::structure_document(&blocks)
        .with_context(|| format!("failed to structure {}", path.display()))?;
    Ok(doc)
}

fn write_out(content: &str, output: Option<&std::path::Path>) -> anyhow::Result<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    };
    writer.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
        writeln!(writer)?;
    }
    Ok(())
}
