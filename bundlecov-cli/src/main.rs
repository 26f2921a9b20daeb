//! bundlecov CLI - finds never-executed modules in JavaScript bundles.
//!
//! Features:
//! - Reads Chrome DevTools / Puppeteer coverage exports (file or directory)
//! - Locates the webpack module registry in every bundle
//! - Sizes unused modules against the project's files on disk
//! - Totals unused bytes per npm package

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use bundlecov_core::{
    init_structured_logging, load_config, load_config_file, print_json, print_plain,
    Bundlecov, BundlecovConfig, CoverageReport,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Find unused modules in JavaScript bundles from coverage profiles")]
pub struct Cli {
    /// Coverage file to process (or a directory of coverage files)
    #[arg(short, long)]
    file: PathBuf,

    /// Root of the project, used to compute module sizes
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Module names or patterns to ignore
    #[arg(long, num_args = 1..)]
    ignore: Vec<String>,

    /// Only analyze assets whose URL matches this regex
    #[arg(long, value_name = "REGEX")]
    asset_filter: Option<String>,

    /// Read configuration from this file instead of ./bundlecov.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Trust the profile ordering and skip sorting/merging ranges
    #[arg(long)]
    no_normalize: bool,

    /// Exit with code 1 when any unused module is found
    #[arg(long)]
    strict: bool,
}

/// Loads configuration. Malformed TOML is downgraded to a warning; an
/// unreadable `--config` file is fatal.
fn read_config(cli: &Cli) -> Result<BundlecovConfig> {
    let loaded = match &cli.config {
        Some(path) => load_config_file(path).map(Some),
        None => load_config(Path::new(".")),
    };

    match loaded {
        Ok(cfg) => Ok(cfg.unwrap_or_default()),
        Err(e) if e.is_recoverable() => {
            eprintln!("[WARN] config load failed: {}", e);
            Ok(BundlecovConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Merges CLI flags over the configuration file into an analysis builder.
fn build_analysis(cli: &Cli, cfg: &BundlecovConfig) -> Bundlecov {
    let mut analysis = Bundlecov::new(&cli.file).normalize(!cli.no_normalize);

    if let Some(root) = cli.root.as_ref().or(cfg.root.as_ref()) {
        analysis = analysis.with_root(root);
    }

    let mut ignore = cli.ignore.clone();
    if let Some(list) = &cfg.ignore {
        ignore.extend(list.iter().cloned());
    }
    analysis = analysis.ignore_patterns(ignore);

    if let Some(filter) = cli.asset_filter.as_ref().or(cfg.asset_filter.as_ref()) {
        analysis = analysis.asset_filter(filter.as_str());
    }

    analysis
}

fn run(cli: &Cli) -> Result<CoverageReport> {
    if !cli.file.exists() {
        return Err(anyhow!("Coverage input not found: {}", cli.file.display()));
    }
    if let Some(root) = &cli.root {
        if !root.is_dir() {
            return Err(anyhow!("Project root is not a directory: {}", root.display()));
        }
    }

    let cfg = read_config(cli)?;
    let report = build_analysis(cli, &cfg)
        .analyze()
        .with_context(|| format!("Failed to analyze {}", cli.file.display()))?;

    if cli.json || cfg.wants_json() {
        print_json(&report);
    } else {
        print_plain(&report);
    }

    Ok(report)
}

fn main() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] bundlecov internal error: {}", info);
        eprintln!("[PANIC] The process will exit with code 2.");
    }));

    // Structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(report) => {
            let failed = cli.strict && report.has_unused();
            std::process::exit(if failed { 1 } else { 0 });
        }
        Err(e) => {
            eprintln!("[ERROR] {:#}", e);
            std::process::exit(2);
        }
    }
}
