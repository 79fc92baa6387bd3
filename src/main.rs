//! Site-Harvester main entry point
//!
//! This is the command-line interface for the Site-Harvester page harvester.

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use site_harvester::config::{
    load_config_or_default, validate, Config, PageLimit, ResolutionPolicy, RunConfig,
};
use site_harvester::crawler::{effective_pages, pool_size, ContentVariant, Coordinator, PageCountPrompt};
use site_harvester::output::print_summary;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Harvester: fetch website pages and build a local knowledge base
///
/// Site-Harvester reads a site's sitemap tree, fetches the pages it lists
/// and stores their text (or reader-mode markdown) under
/// `<storage-root>/<site>/`.
#[derive(Parser, Debug)]
#[command(name = "site-harvester")]
#[command(version)]
#[command(about = "Fetch website pages and create a knowledge base", long_about = None)]
struct Cli {
    /// Website URL (prompted for when omitted)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Fetch all available pages
    #[arg(long, visible_alias = "nl", conflicts_with = "pages")]
    no_limit: bool,

    /// Number of pages to fetch (skips the page-count prompt)
    #[arg(short = 'n', long, value_name = "N")]
    pages: Option<usize>,

    /// Store reader-mode markdown instead of plain text
    #[arg(short, long)]
    reader: bool,

    /// Show per-page progress and failures
    #[arg(short, long)]
    debug: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with_all = ["verbose", "debug"])]
    quiet: bool,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory pages are stored under (overrides the config file)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Skip sitemaps that fail to load instead of aborting
    #[arg(long)]
    best_effort: bool,

    /// Upper bound on concurrent fetches (overrides the config file)
    #[arg(long, value_name = "N")]
    max_workers: Option<usize>,

    /// Resolve the sitemap and show what would be fetched without fetching
    #[arg(long)]
    dry_run: bool,
}

/// Asks on stdin how many pages to fetch when a site exceeds the default cap
struct StdinPrompt;

impl PageCountPrompt for StdinPrompt {
    fn choose(&self, total: usize, requested: usize) -> Option<usize> {
        println!("Found {} pages.", total);
        let answer = match prompt_line(&format!(
            "Enter number of pages to scrape (default: {}): ",
            requested
        )) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!("Failed to read page count: {}", e);
                return None;
            }
        };

        if answer.is_empty() {
            return None;
        }
        match answer.parse::<usize>() {
            Ok(n) if n > 0 => Some(n),
            _ => {
                tracing::warn!("'{}' is not a valid page count, using {}", answer, requested);
                None
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose.max(u8::from(cli.debug)), cli.quiet);

    // Load configuration and apply command-line overrides
    let mut config = load_config_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(output) = &cli.output {
        config.output.storage_root = output.clone();
    }
    if let Some(max_workers) = cli.max_workers {
        config.crawler.max_workers = max_workers;
    }
    if cli.best_effort {
        config.crawler.resolution_policy = ResolutionPolicy::BestEffort;
    }
    validate(&config).context("Invalid configuration")?;

    // Resolve the per-run configuration
    let url = match &cli.url {
        Some(url) => url.clone(),
        None => prompt_line("Enter website URL: ").context("Failed to read URL")?,
    };
    let page_limit = if cli.no_limit {
        PageLimit::Unlimited
    } else {
        PageLimit::Capped(cli.pages.unwrap_or(config.crawler.default_page_cap))
    };
    let run = RunConfig {
        url,
        page_limit,
        variant: if cli.reader {
            ContentVariant::Reader
        } else {
            ContentVariant::PlainText
        },
        debug: cli.debug,
    };

    if cli.dry_run {
        handle_dry_run(config, &run).await
    } else {
        let interactive = cli.pages.is_none() && !cli.no_limit && io::stdin().is_terminal();
        handle_harvest(config, &run, interactive, cli.quiet).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_harvester=info,warn"),
            1 => EnvFilter::new("site_harvester=debug,info"),
            2 => EnvFilter::new("site_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Prints a prompt and reads one trimmed line from stdin
fn prompt_line(prompt: &str) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Handles the --dry-run mode: resolves the sitemap and shows what would be fetched
async fn handle_dry_run(config: Config, run: &RunConfig) -> anyhow::Result<()> {
    let default_cap = config.crawler.default_page_cap;
    let pages_per_worker = config.crawler.pages_per_worker;
    let max_workers = config.crawler.max_workers;
    let storage_root = config.output.storage_root.clone();

    let coordinator = Coordinator::new(config)?;
    let (origin, resolution) = coordinator
        .discover(run)
        .await
        .context("Sitemap resolution failed")?;

    let pages = effective_pages(resolution.total(), run.page_limit, default_cap, None);

    println!("=== Site-Harvester Dry Run ===\n");
    println!("Origin: {}", origin);
    println!("Sitemap: {}/sitemap.xml", origin);
    println!("Output directory: {}", storage_root.display());
    println!("Content: {}", run.variant);
    println!("\nPages listed: {}", resolution.total());
    println!("Pages to fetch: {}", pages);
    println!("Workers: {}", pool_size(pages, pages_per_worker, max_workers));

    if !resolution.is_complete() {
        println!("\nSkipped sitemaps ({}):", resolution.failures.len());
        for failure in &resolution.failures {
            println!("  - {}: {}", failure.url, failure.reason);
        }
    }

    println!("\nWould fetch:");
    for url in resolution.urls.iter().take(pages) {
        println!("  - {}", url);
    }

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: Config,
    run: &RunConfig,
    interactive: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")
        {
            bar.set_style(style.progress_chars("##-"));
        }
        bar
    };

    let mut coordinator = Coordinator::new(config)?.with_progress(progress);
    if interactive {
        coordinator = coordinator.with_prompt(StdinPrompt);
    }

    match coordinator.run(run).await {
        Ok(result) => {
            if !quiet {
                print_summary(&result);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
