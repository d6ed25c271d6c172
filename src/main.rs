//! mdx2md - MDX/HTML docs to plain Markdown

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{LevelFilter, info};
use tempfile::TempDir;

use mdx2md::archive::{PackConfig, extract_zip, pack_dir};
use mdx2md::{ConversionReport, ConvertConfig, Converter, ExpressionMode, ImageLinkStyle};

#[derive(Parser)]
#[command(name = "mdx2md")]
#[command(version, about = "Convert MDX/HTML docs to plain Markdown", long_about = None)]
#[command(after_help = "EXAMPLES:
    mdx2md docs/ out/              Convert a docs directory
    mdx2md repo-main.zip out.zip   Convert a repository archive into an archive
    mdx2md --json docs/ out/       Print the conversion report as JSON")]
struct Cli {
    /// Input directory or .zip archive
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory, or a path ending in .zip
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Remove nested and multi-line {expressions} instead of cutting at the first `}`
    #[arg(long)]
    balanced_braces: bool,

    /// Link every image as ./images/<name>, whatever the document depth
    #[arg(long)]
    flat_image_links: bool,

    /// Do not write summary.md
    #[arg(long)]
    no_summary: bool,

    /// Print the conversion report as JSON
    #[arg(long)]
    json: bool,

    /// Suppress output messages
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log every file and image
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(report) => {
            print_report(&cli, &report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        LevelFilter::Warn
    } else if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> mdx2md::Result<ConversionReport> {
    let config = ConvertConfig::default()
        .with_expressions(if cli.balanced_braces {
            ExpressionMode::Balanced
        } else {
            ExpressionMode::FirstClose
        })
        .with_image_links(if cli.flat_image_links {
            ImageLinkStyle::Flat
        } else {
            ImageLinkStyle::Relative
        })
        .with_summary(!cli.no_summary);
    let converter = Converter::with_config(config);

    // Keeps the extracted archive alive until the conversion is done
    let extracted = if is_zip(&cli.input) {
        Some(TempDir::new()?)
    } else {
        None
    };
    let input = match &extracted {
        Some(scratch) => {
            let root = extract_zip(&cli.input, scratch.path())?;
            info!("extracted {} into {}", cli.input.display(), root.display());
            root
        }
        None => cli.input.clone(),
    };

    if is_zip(&cli.output) {
        let staging = TempDir::new()?;
        let mut report = converter.run(&input, staging.path())?;
        let files = pack_dir(staging.path(), &cli.output, &PackConfig::default())?;
        info!("wrote {files} files to {}", cli.output.display());
        // The staging copy is gone; name the entry inside the archive instead
        report.summary = report
            .summary
            .and_then(|p| p.strip_prefix(staging.path()).ok().map(Path::to_path_buf));
        Ok(report)
    } else {
        converter.run(&input, &cli.output)
    }
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

fn print_report(cli: &Cli, report: &ConversionReport) {
    if cli.json {
        match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("error: cannot serialize report: {e}"),
        }
        return;
    }

    if cli.quiet {
        return;
    }

    for failure in &report.failures {
        eprintln!("failed: {}: {}", failure.source.display(), failure.error);
    }
    println!(
        "Converted {} documents ({} failed), copied {} images ({} missing)",
        report.documents.len(),
        report.failures.len(),
        report.assets_copied,
        report.missing_assets.len()
    );
    if let Some(summary) = &report.summary {
        println!("Index: {}", summary.display());
    }
}
