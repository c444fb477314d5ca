// src/pipeline/sources.rs

//! Candidate gathering from the catalog file and the Radio Browser directory.

use std::path::Path;

use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{Candidate, Catalog, RadioBrowserConfig};
use crate::services::RadioBrowserClient;

/// Collect candidates: curated catalog entries first, directory entries after.
///
/// A missing catalog is tolerated only when the directory is enabled. A
/// directory failure is logged and skipped as long as the catalog yielded
/// stations.
pub async fn load_candidates(
    catalog_path: &Path,
    radio_browser: &RadioBrowserConfig,
    client: &Client,
) -> Result<Vec<Candidate>> {
    let mut candidates = if catalog_path.exists() {
        let catalog = Catalog::load(catalog_path)?;
        catalog.validate()?;
        log::info!(
            "Loaded {} curated stations from {}",
            catalog.len(),
            catalog_path.display()
        );
        catalog.stations
    } else if radio_browser.enabled {
        log::warn!("Catalog not found at {}", catalog_path.display());
        Vec::new()
    } else {
        return Err(AppError::config(format!(
            "Catalog not found at {} and Radio Browser is disabled",
            catalog_path.display()
        )));
    };

    if radio_browser.enabled {
        let directory = RadioBrowserClient::new(client.clone(), radio_browser);
        match directory.fetch_stations().await {
            Ok(stations) => candidates.extend(stations),
            Err(e) if !candidates.is_empty() => {
                log::warn!("Radio Browser fetch failed, continuing with catalog only: {}", e);
            }
            Err(e) => return Err(e),
        }
    }

    if candidates.is_empty() {
        return Err(AppError::validation("No candidate stations to validate"));
    }
    Ok(candidates)
}
