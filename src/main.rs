//! Wheel-Harvest main entry point
//!
//! This is the command-line interface for the Wheel-Harvest pipeline.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use wheel_harvest::checkpoint::{CheckpointStore, JsonCheckpointStore};
use wheel_harvest::config::{load_config_with_hash, Config};
use wheel_harvest::export::{
    load_site_products, print_summary, run_export, ExportTargets, FailedSite,
};
use wheel_harvest::orchestrator::Orchestrator;
use wheel_harvest::storage::{open_ledger, Ledger, SqliteLedger};

/// Wheel-Harvest: a resumable wheel-part harvester
///
/// Collects wheel products and their vehicle fitments from the configured
/// vendor catalogs, checkpointing each site as it completes, then exports a
/// fitment-expanded table and a summary report.
#[derive(Parser, Debug)]
#[command(name = "wheel-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable wheel-part harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Delete existing checkpoints (of --site, or all sites) before running
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "export_only"])]
    fresh: bool,

    /// Harvest only this site
    #[arg(long, value_name = "NAME")]
    site: Option<String>,

    /// Validate config and show checkpoint status without fetching anything
    #[arg(long, conflicts_with_all = ["stats", "export_only"])]
    dry_run: bool,

    /// Show recent runs and failures from the run ledger and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_only"])]
    stats: bool,

    /// Rebuild the export and summary from existing checkpoints and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_only: bool,

    /// Also write one table per site
    #[arg(long)]
    split_by_site: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(name) = &cli.site {
        if config.site(name).is_none() {
            anyhow::bail!("Unknown site: {}", name);
        }
    }

    if cli.dry_run {
        handle_dry_run(&config, cli.site.as_deref())?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_only {
        handle_export_only(&config, cli.split_by_site)?;
    } else {
        handle_harvest(config, config_hash, &cli).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wheel_harvest=info,warn"),
            1 => EnvFilter::new("wheel_harvest=debug,info"),
            2 => EnvFilter::new("wheel_harvest=trace,debug"),
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

fn open_store(config: &Config) -> anyhow::Result<JsonCheckpointStore> {
    JsonCheckpointStore::new(&config.output.checkpoint_dir).with_context(|| {
        format!(
            "Cannot use checkpoint directory {}",
            config.output.checkpoint_dir
        )
    })
}

fn export_targets(config: &Config, split_by_site: bool) -> anyhow::Result<ExportTargets> {
    let split_dir = if split_by_site {
        let dir = config.output.split_dir.as_deref().ok_or_else(|| {
            anyhow::anyhow!("--split-by-site needs output.split-dir in the configuration")
        })?;
        Some(PathBuf::from(dir))
    } else {
        None
    };

    Ok(ExportTargets {
        table: PathBuf::from(&config.output.export_path),
        summary: PathBuf::from(&config.output.summary_path),
        split_dir,
    })
}

/// Appends failures not already listed for the same site
fn merge_failures(mut failed: Vec<FailedSite>, more: Vec<FailedSite>) -> Vec<FailedSite> {
    for entry in more {
        if !failed.iter().any(|f| f.site == entry.site) {
            failed.push(entry);
        }
    }
    failed
}

/// Handles the --dry-run mode: shows the validated config and checkpoint status
fn handle_dry_run(config: &Config, only_site: Option<&str>) -> anyhow::Result<()> {
    let store = open_store(config)?;

    println!("=== Wheel-Harvest Dry Run ===\n");

    println!("Harvest Configuration:");
    println!("  Request delay: {}ms", config.harvest.request_delay);
    println!("  Max attempts: {}", config.harvest.max_attempts);
    println!("  Site retry budget: {}", config.harvest.site_retry_budget);
    println!("  Max listing pages: {}", config.harvest.max_listing_pages);
    println!("  Max empty pages: {}", config.harvest.max_empty_pages);
    println!("  Workers per site: {}", config.harvest.workers_per_site);
    println!("  Request timeout: {}s", config.harvest.request_timeout);

    println!("\nUser Agent:");
    println!("  Mode: {:?}", config.user_agent.mode);
    if let Some(value) = &config.user_agent.value {
        println!("  Value: {}", value);
    }

    println!("\nOutput:");
    println!("  Checkpoints: {}", config.output.checkpoint_dir);
    println!("  Ledger: {}", config.output.ledger_path);
    println!("  Export: {}", config.output.export_path);
    println!("  Summary: {}", config.output.summary_path);
    if let Some(dir) = &config.output.split_dir {
        println!("  Split: {}", dir);
    }

    let mut to_run = 0;
    println!("\nSites ({}):", config.sites.len());
    for site in &config.sites {
        if only_site.is_some_and(|only| only != site.name) {
            continue;
        }
        let status = match store.load(&site.name) {
            Ok(Some(checkpoint)) if checkpoint.matches(site) => format!(
                "completed {} ({} products)",
                checkpoint.completed_at,
                checkpoint.products.len()
            ),
            Ok(Some(checkpoint)) => format!(
                "completed {} ({} products, site configuration changed since)",
                checkpoint.completed_at,
                checkpoint.products.len()
            ),
            Ok(None) => {
                to_run += 1;
                "pending".to_string()
            }
            Err(e) => {
                to_run += 1;
                format!("unreadable checkpoint: {}", e)
            }
        };
        println!(
            "  - {} [{:?}, {:?}] {}",
            site.name, site.search_strategy, site.extractor, site.base_url
        );
        println!("    {}", status);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would harvest {} sites", to_run);

    Ok(())
}

/// Handles the --stats mode: shows recent runs from the ledger
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Ledger: {}\n", config.output.ledger_path);

    let ledger = SqliteLedger::new(Path::new(&config.output.ledger_path))?;

    println!("=== Recent Runs ===\n");
    for run in ledger.recent_runs(10)? {
        println!(
            "  #{} {} started {} finished {}",
            run.id,
            run.status.to_db_string(),
            run.started_at,
            run.finished_at.as_deref().unwrap_or("-")
        );
        for record in ledger.outcomes_for_run(run.id)? {
            let outcome = record.outcome;
            println!(
                "      {}: {} ({} products, {} failed URLs{}){}",
                outcome.site,
                outcome.state,
                outcome.products,
                outcome.failed_urls,
                if outcome.resumed { ", resumed" } else { "" },
                outcome
                    .reason
                    .map(|reason| format!(" - {}", reason))
                    .unwrap_or_default()
            );
        }
    }
    println!();

    let failures = ledger.latest_failures()?;
    if failures.is_empty() {
        println!("No failed sites in the latest run");
    } else {
        println!("Failed Sites ({}):", failures.len());
        for record in failures {
            println!(
                "  - {}: {}",
                record.outcome.site,
                record.outcome.reason.unwrap_or_default()
            );
        }
    }

    Ok(())
}

/// Handles the --export-only mode: rebuilds artifacts from checkpoints
fn handle_export_only(config: &Config, split_by_site: bool) -> anyhow::Result<()> {
    let targets = export_targets(config, split_by_site)?;
    let store = open_store(config)?;

    let failed = match SqliteLedger::new(Path::new(&config.output.ledger_path)) {
        Ok(ledger) => ledger
            .latest_failures()?
            .into_iter()
            .filter(|record| !store.contains(&record.outcome.site).unwrap_or(false))
            .map(|record| FailedSite {
                site: record.outcome.site,
                reason: record.outcome.reason.unwrap_or_default(),
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Run ledger unavailable, failed sites not listed: {}", e);
            Vec::new()
        }
    };

    let loaded = load_site_products(&store, &config.sites);
    tracing::info!("Exporting {} checkpointed sites", loaded.sites.len());
    let failed = merge_failures(failed, loaded.unreadable);
    let summary = run_export(&loaded.sites, failed, &targets)?;
    print_summary(&summary);

    Ok(())
}

/// Handles the main harvest: run every site, then export
async fn handle_harvest(config: Config, config_hash: String, cli: &Cli) -> anyhow::Result<()> {
    let targets = export_targets(&config, cli.split_by_site)?;
    let store: Arc<dyn CheckpointStore> = Arc::new(open_store(&config)?);
    let ledger = open_ledger(Path::new(&config.output.ledger_path)).with_context(|| {
        format!("Cannot open run ledger {}", config.output.ledger_path)
    })?;

    let descriptors = config.sites.clone();
    tracing::info!("Harvesting {} configured sites", descriptors.len());

    let cancel = CancellationToken::new();
    let mut orchestrator = Orchestrator::new(config, store.clone(), Box::new(ledger))?
        .with_cancellation(cancel.clone())
        .with_config_hash(config_hash);
    if let Some(name) = &cli.site {
        orchestrator = orchestrator.with_site_filter(name)?;
    }

    if cli.fresh {
        let removed = orchestrator.reset_checkpoints()?;
        tracing::info!("Starting fresh: removed {} checkpoints", removed);
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current request");
            cancel.cancel();
        }
    });

    let outcome = orchestrator.run().await?;

    if outcome.interrupted {
        tracing::warn!(
            "Run interrupted; {} sites will be harvested on the next run",
            outcome.pending.len()
        );
        return Ok(());
    }

    let failed: Vec<FailedSite> = outcome
        .failed()
        .map(|report| FailedSite {
            site: report.name.clone(),
            reason: report.reason.clone().unwrap_or_default(),
        })
        .collect();

    let loaded = load_site_products(store.as_ref(), &descriptors);
    let failed = merge_failures(failed, loaded.unreadable);
    let summary = run_export(&loaded.sites, failed, &targets)?;
    print_summary(&summary);

    if !outcome.is_success() {
        tracing::warn!(
            "{} sites failed; rerun to retry them",
            outcome.failed().count()
        );
    }

    Ok(())
}
