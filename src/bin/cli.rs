//! stationcheck CLI
//!
//! Validates radio stream endpoints and writes the tuner station map.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use stationcheck::{
    error::Result,
    models::{Catalog, Config},
    pipeline::{self, BatchScheduler},
    services::{FallbackResolver, HttpProbe, Probe},
    storage::{LocalStorage, ReportStorage},
    utils::http,
};
use tokio_util::sync::CancellationToken;

/// stationcheck - Radio Stream Validator
#[derive(Parser, Debug)]
#[command(
    name = "stationcheck",
    version,
    about = "Validates radio stream endpoints and builds the tuner station map"
)]
struct Cli {
    /// Path to storage directory containing config and catalog files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe every candidate and write the report and station map
    Run {
        /// Candidates probed concurrently per window
        #[arg(long)]
        batch_size: Option<usize>,

        /// Per-phase probe timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Idle time between windows in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Also pull popular stations from the Radio Browser directory
        #[arg(long)]
        radio_browser: bool,

        /// Catalog file (default: {storage_dir}/{sources.catalog_file})
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Rebuild the station map from the stored report
    Map,

    /// Validate configuration and catalog files
    Validate {
        /// Catalog file (default: {storage_dir}/{sources.catalog_file})
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Show stored report info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// First Ctrl-C stops launching windows, the second aborts in-flight probes.
fn install_interrupt_handler(stop: CancellationToken, abort: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        log::warn!("Interrupt received: finishing the current batch. Press Ctrl-C again to abort.");
        stop.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Aborting in-flight probes");
            abort.cancel();
        }
    });
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("stationcheck starting...");

    let config_path = cli.storage_dir.join("config.toml");
    let mut config = Config::load_or_default(&config_path)?;
    log::info!("Loaded configuration from {}", cli.storage_dir.display());

    let storage = LocalStorage::with_output(&cli.storage_dir, &config.output);
    let default_catalog = cli.storage_dir.join(&config.sources.catalog_file);

    match cli.command {
        Command::Run {
            batch_size,
            timeout_ms,
            delay_ms,
            radio_browser,
            catalog,
        } => {
            if let Some(size) = batch_size {
                config.batch.size = size;
            }
            if let Some(ms) = timeout_ms {
                config.probe.timeout_ms = ms;
            }
            if let Some(ms) = delay_ms {
                config.batch.delay_ms = ms;
            }
            if radio_browser {
                config.sources.radio_browser.enabled = true;
            }
            config.validate()?;

            let client = http::create_async_client(&config.probe)?;
            let catalog_path = catalog.unwrap_or(default_catalog);
            let candidates =
                pipeline::load_candidates(&catalog_path, &config.sources.radio_browser, &client)
                    .await?;

            let probe: Arc<dyn Probe> =
                Arc::new(HttpProbe::with_client(client, config.probe.sniff_bytes));
            let stop = CancellationToken::new();
            let abort = CancellationToken::new();
            install_interrupt_handler(stop.clone(), abort.clone());

            let resolver = FallbackResolver::new(probe);
            let scheduler = BatchScheduler::from_config(resolver, &config.batch, &config.probe)
                .with_stop_token(stop)
                .with_abort_token(abort);

            let report =
                pipeline::run_validation(&config, &candidates, &scheduler, &storage).await?;
            log::info!(
                "Validation complete: {}/{} working ({})",
                report.working.len(),
                report.total_tested,
                report.success_rate()
            );
        }

        Command::Map => {
            let map = pipeline::rebuild_station_map(&config, &storage).await?;
            log::info!("Station map rebuilt with {} frequencies", map.len());
        }

        Command::Validate { catalog } => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            let catalog_path = catalog.unwrap_or(default_catalog);
            let catalog = Catalog::load(&catalog_path)?;
            if let Err(e) = catalog.validate() {
                log::error!("Catalog validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Catalog OK ({} stations in {})",
                catalog.len(),
                catalog_path.display()
            );

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());

            match storage.load_report().await? {
                Some(report) => {
                    log::info!("Last run: {}", report.timestamp);
                    log::info!(
                        "Tested: {}, working: {}, failed: {} ({})",
                        report.total_tested,
                        report.working,
                        report.failed,
                        report.success_rate
                    );
                }
                None => log::info!("No report found yet."),
            }

            match storage.load_station_map().await? {
                Some(map) => log::info!("Station map: {} frequencies", map.len()),
                None => log::info!("Station map: not found"),
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
