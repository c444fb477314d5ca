// src/models/candidate.rs

//! Candidate stations and the catalogs they are read from.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::url::normalize_url;

/// One station to validate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Display name
    pub name: String,

    /// Primary stream URL
    #[serde(default)]
    pub url: String,

    /// Alternate stream URL, probed when the primary fails
    #[serde(default, alias = "fallback_url", skip_serializing_if = "Option::is_none")]
    pub fallback_url: Option<String>,

    #[serde(default = "unknown")]
    pub genre: String,

    #[serde(default = "unknown")]
    pub country: String,

    #[serde(default = "unknown")]
    pub language: String,
}

fn unknown() -> String {
    "Unknown".into()
}

impl Candidate {
    /// Create a candidate with only a name and primary URL.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            fallback_url: None,
            genre: unknown(),
            country: unknown(),
            language: unknown(),
        }
    }

    /// Attach a fallback URL.
    pub fn with_fallback(mut self, url: impl Into<String>) -> Self {
        self.fallback_url = Some(url.into());
        self
    }

    /// Primary URL, if present.
    pub fn primary(&self) -> Option<&str> {
        Some(self.url.trim()).filter(|u| !u.is_empty())
    }

    /// Fallback URL, if present.
    pub fn fallback(&self) -> Option<&str> {
        self.fallback_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    /// Identity used for deduplication: the normalized primary URL,
    /// or the normalized fallback when the primary is empty.
    pub fn identity(&self) -> Option<String> {
        self.primary().or_else(|| self.fallback()).map(normalize_url)
    }
}

/// A list of candidates read from a static catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub stations: Vec<Candidate>,
}

/// JSON catalogs may be a bare array or wrapped in `{ "stations": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonCatalog {
    Bare(Vec<Candidate>),
    Wrapped(Catalog),
}

impl Catalog {
    /// Load a catalog from a TOML or JSON file, chosen by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let context = path.display().to_string();

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content).map_err(|e| AppError::catalog(context, e)),
            Some("toml") => Ok(toml::from_str(&content)?),
            other => Err(AppError::catalog(
                context,
                format!("unsupported catalog extension {:?}", other.unwrap_or("")),
            )),
        }
    }

    /// Parse a JSON catalog.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(match serde_json::from_str(content)? {
            JsonCatalog::Bare(stations) => Self { stations },
            JsonCatalog::Wrapped(catalog) => catalog,
        })
    }

    /// Reject catalogs the engine cannot run over.
    pub fn validate(&self) -> Result<()> {
        if self.stations.is_empty() {
            return Err(AppError::validation("Catalog contains no stations"));
        }
        for (index, station) in self.stations.iter().enumerate() {
            if station.identity().is_none() {
                return Err(AppError::validation(format!(
                    "Station #{} '{}' has neither url nor fallbackUrl",
                    index + 1,
                    station.name
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
