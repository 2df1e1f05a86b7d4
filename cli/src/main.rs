//! docshift CLI - document conversion tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docshift::convert::{Converter, ConvertOptions, SourceDocument, SourceKind, TargetKind};
use docshift::extract::inspect_pdf;
use docshift::render::PaginateOptions;
use docshift::parser::parse_notebook_bytes;
use docshift::{parse_markdown, RenderOptions, RetryPolicy};

#[derive(Parser)]
#[command(name = "docshift")]
#[command(version)]
#[command(about = "Convert PDF, DOCX, notebooks and Markdown to text, HTML, DOCX and PDF", long_about = None)]
struct Cli {
    /// Input file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Target format (first available route if not specified)
    #[arg(long, value_enum)]
    to: Option<Target>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document to another format
    Convert {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Target format
        #[arg(short, long, value_enum)]
        to: Target,

        /// Output file (named after the input if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Document title (defaults to the input file name)
        #[arg(long)]
        title: Option<String>,

        /// Omit the embedded stylesheet from HTML output
        #[arg(long)]
        no_styles: bool,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// List the conversions offered for a document
    Routes {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print the extracted text of a document
    Text {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show document information
    Info {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

/// Paginated layout settings.
#[derive(clap::Args)]
struct LayoutArgs {
    /// Layout width before pagination, in px
    #[arg(long, env = "DOCSHIFT_SURFACE_WIDTH", default_value = "880")]
    surface_width: f32,

    /// Scale from layout px to PDF points
    #[arg(long, env = "DOCSHIFT_SCALE", default_value = "0.7")]
    scale: f32,

    /// Readiness checks before giving up on layout
    #[arg(long, env = "DOCSHIFT_MAX_ATTEMPTS", default_value = "100")]
    max_attempts: u32,

    /// Delay between readiness checks, in milliseconds
    #[arg(long, env = "DOCSHIFT_POLL_INTERVAL_MS", default_value = "100")]
    poll_interval_ms: u64,
}

impl LayoutArgs {
    fn paginate_options(&self) -> PaginateOptions {
        let retry = RetryPolicy::new()
            .with_max_attempts(self.max_attempts)
            .with_interval(Duration::from_millis(self.poll_interval_ms));
        PaginateOptions::new()
            .with_surface_width(self.surface_width)
            .with_scale(self.scale)
            .with_retry(retry)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Target {
    /// Plain text
    Txt,
    /// PDF document
    Pdf,
    /// Word document
    Docx,
    /// HTML page
    Html,
}

impl From<Target> for TargetKind {
    fn from(target: Target) -> Self {
        match target {
            Target::Txt => TargetKind::PlainText,
            Target::Pdf => TargetKind::Pdf,
            Target::Docx => TargetKind::Docx,
            Target::Html => TargetKind::Html,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            to,
            output,
            title,
            no_styles,
            layout,
        }) => {
            let mut render = RenderOptions::new()
                .with_styles(!no_styles)
                .with_paginate(layout.paginate_options());
            if let Some(title) = title {
                render = render.with_title(title);
            }
            cmd_convert(&input, Some(to.into()), output.as_deref(), render)
        }
        Some(Commands::Routes { input }) => cmd_routes(&input),
        Some(Commands::Text { input, output }) => cmd_text(&input, output.as_deref()),
        Some(Commands::Info { input, json }) => cmd_info(&input, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.to.map(Into::into), None, RenderOptions::new())
            } else {
                println!("{}", "Usage: docshift <FILE> [--to FORMAT]".yellow());
                println!("       docshift --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_convert(
    input: &Path,
    target: Option<TargetKind>,
    output: Option<&Path>,
    render: RenderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Reading...");
    let source = SourceDocument::from_path(input)?;
    let converter = Converter::new(ConvertOptions::new().with_render_options(render));
    pb.inc(1);

    let target = match target {
        Some(target) => target,
        None => converter
            .routes_for(&source)?
            .into_iter()
            .find(|r| r.is_enabled())
            .map(|r| r.target)
            .ok_or("No conversions are available for this file")?,
    };

    log::debug!("Converting {} to {}", source.name, target);
    pb.set_message(format!("Converting to {}...", target));
    let artifact = converter.convert(&source, target)?;
    pb.inc(1);

    pb.set_message("Writing...");
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => input.with_file_name(&artifact.name),
    };
    fs::write(&path, &artifact.bytes)?;
    pb.inc(1);

    pb.finish_with_message("Done!");
    println!(
        "{} {} ({} bytes)",
        "Saved to".green(),
        path.display(),
        artifact.len()
    );

    Ok(())
}

fn cmd_routes(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = SourceDocument::from_path(input)?;
    let kind = source.kind()?;
    let converter = Converter::default();
    let routes = converter.routes_for(&source)?;

    println!("{} ({})", input.display().to_string().bold(), kind);
    if routes.is_empty() {
        println!("  {}", "No conversions available".yellow());
    }

    for (i, route) in routes.iter().enumerate() {
        let branch = if i + 1 == routes.len() { "└─" } else { "├─" };
        match &route.disabled_reason {
            None => println!(
                "  {} {} {}",
                branch.dimmed(),
                route.label.green(),
                route.target.mime().dimmed()
            ),
            Some(reason) => println!(
                "  {} {} {}",
                branch.dimmed(),
                route.label.dimmed().strikethrough(),
                reason.yellow()
            ),
        }
    }

    Ok(())
}

fn cmd_text(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let source = SourceDocument::from_path(input)?;
    let text = Converter::default().extract_text(&source)?;

    if let Some(path) = output {
        fs::write(path, &text)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", text);
    }

    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = SourceDocument::from_path(input)?;
    let kind = source.kind()?;

    let mut info = serde_json::Map::new();
    info.insert("file".into(), input.display().to_string().into());
    info.insert("format".into(), kind.name().into());
    info.insert("size".into(), source.bytes.len().into());

    match kind {
        SourceKind::Pdf => {
            let pdf = inspect_pdf(&source.bytes)?;
            info.insert("version".into(), pdf.version.into());
            info.insert("pages".into(), pdf.page_count.into());
            if let Some(title) = pdf.title {
                info.insert("title".into(), title.into());
            }
            if let Some(created) = pdf.created {
                info.insert("created".into(), created.to_rfc3339().into());
            }
        }
        SourceKind::Notebook => {
            let notebook = parse_notebook_bytes(&source.bytes)?;
            info.insert("language".into(), notebook.language.clone().into());
            info.insert("cells".into(), notebook.cell_count().into());
            info.insert("code_cells".into(), notebook.code_cell_count().into());
        }
        SourceKind::Markdown => {
            let doc = parse_markdown(&String::from_utf8_lossy(&source.bytes));
            info.insert("blocks".into(), doc.blocks.len().into());
            info.insert("lists".into(), doc.list_runs.len().into());
        }
        SourceKind::Docx | SourceKind::PlainText => {}
    }

    let routes: Vec<String> = Converter::default()
        .routes_for(&source)?
        .into_iter()
        .filter(|r| r.is_enabled())
        .map(|r| r.target.extension().to_string())
        .collect();
    info.insert("targets".into(), routes.into());

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (key, value) in &info {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            other => other.to_string(),
        };
        println!("{}: {}", capitalize(key).bold(), value);
    }

    Ok(())
}

fn capitalize(key: &str) -> String {
    let label = key.replace('_', " ");
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => label,
    }
}

fn cmd_version() {
    println!("{} {}", "docshift".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document conversion tool");
    println!();
    println!("Library: docshift {}", docshift::VERSION);
    println!("License: MIT");
}
