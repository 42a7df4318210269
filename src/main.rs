//! Wiki-Harvest main entry point
//!
//! This is the command-line interface for the Wiki-Harvest offline content harvester.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wiki_harvest::config::{apply_overrides, load_config_with_hash, Config, Overrides};
use wiki_harvest::crawler::crawl;
use wiki_harvest::output::{print_statistics, rebuild_index};
use wiki_harvest::storage::FsStorage;

/// Wiki-Harvest: A polite offline wiki harvester
///
/// Wiki-Harvest walks a wiki breadth-first while respecting robots.txt and
/// pacing, stores structured page records and localized images, and writes
/// a title index plus a by-type index for offline browsing.
#[derive(Parser, Debug)]
#[command(name = "wiki-harvest")]
#[command(version)]
#[command(about = "A polite offline wiki harvester", long_about = None)]
struct Cli {
    /// Start URL; its host bounds the crawl
    #[arg(value_name = "START_URL")]
    start_url: Option<String>,

    /// Maximum number of pages to process
    #[arg(long = "max", value_name = "N")]
    max_pages: Option<u32>,

    /// Output directory
    #[arg(long = "out", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Only download images whose URL or alt text contains one of these keywords
    #[arg(long = "img-include", value_name = "KEYWORDS")]
    image_include: Option<String>,

    /// Maximum number of image downloads for the whole run
    #[arg(long, value_name = "N")]
    max_images: Option<u32>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate configuration and show what would be crawled without crawling
    #[arg(long, conflicts_with = "rebuild_index")]
    dry_run: bool,

    /// Rebuild index.json and by-type.json from stored pages, without network access
    #[arg(long, conflicts_with = "dry_run")]
    rebuild_index: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let base = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    let overrides = Overrides {
        start_url: cli.start_url,
        max_pages: cli.max_pages,
        output_dir: cli
            .output_dir
            .map(|dir| dir.to_string_lossy().into_owned()),
        image_include: cli.image_include,
        max_images: cli.max_images,
    };
    let config = match apply_overrides(base, overrides) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.rebuild_index {
        handle_rebuild_index(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wiki_harvest=info,warn"),
            1 => EnvFilter::new("wiki_harvest=debug,info"),
            2 => EnvFilter::new("wiki_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Wiki-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Start URL: {}", config.crawler.start_url);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Page delay: {}ms", config.crawler.page_delay_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!(
        "  Banned namespaces: {}",
        config.crawler.banned_namespaces.join(" ")
    );

    println!("\nImages:");
    println!("  Max images: {}", config.images.max_images);
    println!("  Delay: {}ms", config.images.delay_ms);
    if config.images.include.is_empty() {
        println!("  Include filter: (none)");
    } else {
        println!("  Include filter: {}", config.images.include.join(", "));
    }
    println!("  Extra hosts ({}):", config.images.extra_hosts.len());
    for host in &config.images.extra_hosts {
        println!("    - {}", host);
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl up to {} pages starting at {}",
        config.crawler.max_pages, config.crawler.start_url
    );
}

/// Handles the --rebuild-index mode: rewrites both indexes from stored pages
fn handle_rebuild_index(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Rebuilding Index ===\n");
    println!("Output: {}", config.output.directory);

    let mut storage = FsStorage::new(&config.output.directory);
    let written = match rebuild_index(&mut storage) {
        Ok(n) => n,
        Err(e) => {
            tracing::error!("Index rebuild failed: {}", e);
            return Err(e.into());
        }
    };

    println!("✓ Rebuilt index with {} pages", written);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Harvesting {} (max {} pages, max {} images) into {}",
        config.crawler.start_url,
        config.crawler.max_pages,
        config.images.max_images,
        config.output.directory
    );

    match crawl(config).await {
        Ok(stats) => {
            print_statistics(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
