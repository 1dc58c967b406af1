//! pdfoutline CLI - title and heading outline extraction for PDFs

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::batch::{self, BatchOptions, FileStatus};
use pdfoutline::render::{self, JsonFormat, OutputFormat};
use pdfoutline::{InferenceConfig, PageSelection, PdfOutline};

const DEFAULT_INPUT_DIR: &str = "/app/input";
const DEFAULT_OUTPUT_DIR: &str = "/app/output";

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract a title and H1-H6 outline from PDF documents", long_about = None)]
struct Cli {
    /// Directory containing input PDFs
    #[arg(value_name = "INPUT_DIR", env = "PDFOUTLINE_INPUT")]
    input: Option<PathBuf>,

    /// Directory for the JSON outlines
    #[arg(value_name = "OUTPUT_DIR", env = "PDFOUTLINE_OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one JSON outline per PDF in a directory
    Batch {
        /// Directory containing input PDFs
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Directory for the JSON outlines
        #[arg(value_name = "OUTPUT_DIR")]
        output: PathBuf,

        /// Inference configuration (JSON)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Process one document and one page at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Extract the outline of a single PDF
    File {
        /// Input PDF file
        #[arg(value_name = "PDF")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: Format,

        /// Inference configuration (JSON)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print the outline of a PDF as a Markdown list
    Show {
        /// Input PDF file
        #[arg(value_name = "PDF")]
        input: PathBuf,

        /// Inference configuration (JSON)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Show per-line scores and rule decisions, for calibration
    Inspect {
        /// Input PDF file
        #[arg(value_name = "PDF")]
        input: PathBuf,

        /// Only show this page
        #[arg(long, value_name = "N")]
        page: Option<u32>,

        /// Inference configuration (JSON)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    /// {"title", "outline"} JSON
    Json,
    /// Nested Markdown list
    Markdown,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Markdown => OutputFormat::Markdown,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Batch {
            input,
            output,
            config,
            compact,
            sequential,
        }) => cmd_batch(&input, &output, config.as_deref(), compact, sequential),
        Some(Commands::File {
            input,
            output,
            format,
            config,
            pages,
            compact,
        }) => cmd_file(
            &input,
            output.as_deref(),
            format,
            config.as_deref(),
            pages.as_deref(),
            compact,
        ),
        Some(Commands::Show { input, config }) => cmd_show(&input, config.as_deref()),
        Some(Commands::Inspect {
            input,
            page,
            config,
        }) => cmd_inspect(&input, page, config.as_deref()),
        None => {
            let input = cli
                .input
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR));
            let output = cli
                .output
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
            cmd_batch(&input, &output, None, false, false)
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<InferenceConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            log::debug!("Loading inference config from {}", path.display());
            Ok(InferenceConfig::from_file(path)?)
        }
        None => Ok(InferenceConfig::default()),
    }
}

fn cmd_batch(
    input: &Path,
    output: &Path,
    config: Option<&Path>,
    compact: bool,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = BatchOptions::new().with_config(load_config(config)?);
    if compact {
        options = options.with_json_format(JsonFormat::Compact);
    }
    if sequential {
        options = options.sequential();
    }

    let total = batch::collect_inputs(input)?.len();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = batch::run_batch_with_progress(input, output, &options, |outcome| {
        let name = outcome
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        pb.set_message(name);
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    for outcome in &report.outcomes {
        let name = outcome.input.display();
        match &outcome.status {
            FileStatus::Processed {
                headings,
                has_title,
            } => println!(
                "{} {} ({} headings{})",
                "✓".green(),
                name,
                headings,
                if *has_title { ", titled" } else { "" }
            ),
            FileStatus::Skipped(reason) => {
                println!("{} {} ({})", "-".yellow(), name, reason.dimmed())
            }
            FileStatus::Failed(reason) => println!("{} {} ({})", "✗".red(), name, reason),
        }
    }

    println!(
        "\n{} {} processed, {} skipped, {} failed → {}",
        "Done!".green().bold(),
        report.processed(),
        report.skipped(),
        report.failed(),
        output.display()
    );

    Ok(())
}

fn cmd_file(
    input: &Path,
    output: Option<&Path>,
    format: Format,
    config: Option<&Path>,
    pages: Option<&str>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let page_selection = if let Some(p) = pages {
        PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?
    } else {
        PageSelection::All
    };

    let outline = PdfOutline::new()
        .lenient()
        .with_pages(page_selection)
        .with_config(load_config(config)?)
        .outline(input)?;

    let json_format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let rendered = render::render(&outline, format.into(), json_format)?;

    if let Some(path) = output {
        fs::write(path, &rendered)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

fn cmd_show(input: &Path, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let outline = PdfOutline::new()
        .lenient()
        .with_config(load_config(config)?)
        .outline(input)?;

    if outline.is_empty() {
        println!("{}", "No title or headings found".yellow());
    } else {
        print!("{}", render::to_markdown(&outline));
    }

    Ok(())
}

fn cmd_inspect(
    input: &Path,
    page: Option<u32>,
    config: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let builder = PdfOutline::new().lenient().with_config(load_config(config)?);
    let runs = builder.runs(input)?;
    let diagnostics = builder.engine().diagnose(&runs)?;
    let threshold = builder.engine().config().score_threshold;

    println!("{}", "Style Profile".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {:.1}pt", "Body size".bold(), diagnostics.profile.baseline);
    println!("{}: {}", "Body bold".bold(), diagnostics.profile.body_bold);
    for cluster in &diagnostics.profile.clusters {
        println!("  rank {}: {:.1}pt", cluster.rank, cluster.size);
    }
    if let Some(title) = &diagnostics.title {
        println!("{}: {}", "Title".bold(), title.title.text);
    }

    println!();
    println!("{} (threshold {:.1})", "Lines".cyan().bold(), threshold);
    println!("{}", "─".repeat(40).dimmed());

    for diag in diagnostics
        .lines
        .iter()
        .filter(|d| page.map_or(true, |p| d.line.page == p))
    {
        let verdict = if diag.in_title {
            "TITLE".blue().bold()
        } else if diag.accepted {
            "HEAD ".green().bold()
        } else if diag.evaluation.rejected_by.is_some() {
            "REJ  ".red()
        } else {
            "low  ".dimmed()
        };

        let mut signals = diag
            .evaluation
            .signals
            .iter()
            .map(|(name, score)| format!("{}={:.1}", name, score))
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(rule) = diag.evaluation.rejected_by {
            signals = format!("rejected by {}", rule);
        }

        println!(
            "{} p{:<3} {:>5.1}pt {} {:>5.2}  {}  {}",
            verdict,
            diag.line.page,
            diag.line.font_size,
            if diag.line.bold { "B" } else { " " },
            diag.evaluation.score,
            diag.line.text,
            signals.dimmed()
        );
    }

    Ok(())
}
