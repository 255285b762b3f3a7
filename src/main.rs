use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use closure_deps::core::{Analysis, DependencyAnalyzer};
use closure_deps::parsers::{Source, SourceCache};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "closure-deps",
    version,
    about = "Extract goog.provide/goog.require declarations with an mtime-validated cache"
)]
struct Cli {
    /// Input file or directory to scan
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    /// Cache file reused across runs
    #[arg(short, long, value_name = "FILE", default_value = ".closure-deps-cache.json")]
    cache: PathBuf,

    /// Extract every file without reading or writing the cache
    #[arg(long)]
    no_cache: bool,

    /// Comma-separated list of file extensions to scan
    #[arg(
        short,
        long,
        value_name = "EXTS",
        value_delimiter = ',',
        default_value = "js"
    )]
    extensions: Vec<String>,

    /// Output format: text, json
    #[arg(short, long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Keep the parsed syntax summary of each extracted file (shown in JSON output)
    #[arg(long)]
    syntax_tree: bool,

    /// Log cache and extraction decisions
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        input,
        cache,
        no_cache,
        extensions,
        format,
        syntax_tree,
        verbose: _,
    } = cli;

    let start_time = Instant::now();

    let extensions: Vec<String> = extensions
        .into_iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_string())
        .filter(|ext| !ext.is_empty())
        .collect();

    let cache = (!no_cache).then(|| SourceCache::load(cache));
    let mut analyzer = DependencyAnalyzer::new(cache)
        .with_extensions(extensions)
        .with_syntax_tree(syntax_tree);

    let analysis = analyzer.analyze(&input)?;
    analyzer.save_cache()?;

    match format {
        OutputFormat::Text => print_text(&analysis),
        OutputFormat::Json => print_json(&analysis)?,
    }

    info!(
        files = analysis.sources.len(),
        cache_hits = analysis.cache_hits,
        failed = analysis.failures.len(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "done"
    );

    if !analysis.failures.is_empty() {
        anyhow::bail!("{} file(s) could not be scanned", analysis.failures.len());
    }
    Ok(())
}

fn print_text(analysis: &Analysis) {
    for source in &analysis.sources {
        let marker = if source.is_module() { " (module)" } else { "" };
        println!("{}{}", source.path().display(), marker);
        if !source.provides().is_empty() {
            println!("  provides: {}", source.provides().join(", "));
        }
        if !source.requires().is_empty() {
            println!("  requires: {}", source.requires().join(", "));
        }
    }
}

fn print_json(analysis: &Analysis) -> Result<()> {
    let by_path: BTreeMap<String, &Source> = analysis
        .sources
        .iter()
        .map(|source| (source.path().display().to_string(), source))
        .collect();
    let json = serde_json::to_string_pretty(&by_path).context("Failed to serialize results")?;
    println!("{json}");
    Ok(())
}
