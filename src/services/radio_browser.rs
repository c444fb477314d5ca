// src/services/radio_browser.rs

//! Radio Browser directory client.
//!
//! Pulls the most-clicked HTTPS stations that the directory has not already
//! marked as broken, and turns them into candidates.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{Candidate, RadioBrowserConfig};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Station record as returned by `/json/stations/search`.
#[derive(Debug, Deserialize)]
struct ApiStation {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    url_resolved: Option<String>,
    #[serde(default)]
    tags: Option<Tags>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

/// Tags come back comma-separated, some mirrors return a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Tags {
    Joined(String),
    List(Vec<String>),
}

impl Tags {
    fn joined(&self) -> String {
        match self {
            Tags::Joined(s) => s
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            Tags::List(list) => list
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl From<ApiStation> for Candidate {
    fn from(station: ApiStation) -> Self {
        let url = non_empty(station.url_resolved.as_deref())
            .or_else(|| non_empty(station.url.as_deref()))
            .unwrap_or_default();
        let genre = station
            .tags
            .as_ref()
            .map(Tags::joined)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Unknown".into());

        Candidate {
            name: non_empty(station.name.as_deref()).unwrap_or_else(|| "Unknown Station".into()),
            url,
            fallback_url: None,
            genre,
            country: non_empty(station.country.as_deref()).unwrap_or_else(|| "Unknown".into()),
            language: non_empty(station.language.as_deref())
                .unwrap_or_else(|| "Unknown".into()),
        }
    }
}

/// Client for the public Radio Browser API.
pub struct RadioBrowserClient {
    client: Client,
    base_url: String,
    limit: usize,
}

/// Fixed query: working HTTPS stations, most clicked first.
const SEARCH_QUERY: &str = "hidebroken=true&is_https=true&order=clickcount&reverse=true";

impl RadioBrowserClient {
    pub fn new(client: Client, config: &RadioBrowserConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limit: config.limit,
        }
    }

    fn search_url(&self) -> String {
        format!(
            "{}/json/stations/search?{}&limit={}",
            self.base_url, SEARCH_QUERY, self.limit
        )
    }

    /// Fetch popular stations as candidates.
    pub async fn fetch_stations(&self) -> Result<Vec<Candidate>> {
        let url = self.search_url();
        log::info!("Fetching stations from {}", url);

        let body = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let stations = parse_stations(&body)?;
        log::info!("Radio Browser returned {} stations", stations.len());
        Ok(stations)
    }
}

/// Parse a search response body into candidates.
fn parse_stations(body: &str) -> Result<Vec<Candidate>> {
    let stations: Vec<ApiStation> = serde_json::from_str(body)?;
    Ok(stations.into_iter().map(Candidate::from).collect())
}
