//! Storage abstractions for validation artifacts.
//!
//! A run produces two JSON documents in the storage directory:
//!
//! ```text
//! storage/
//! ├── config.toml                     # Configuration
//! ├── catalog.toml                    # Curated candidates
//! ├── radio-validation-results.json   # Report: working and failed stations
//! └── station-map.json                # Frequency → station for the tuner
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Report, ReportDocument, StationMap};

pub use local::LocalStorage;

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteSummary {
    /// Where the document was written
    pub location: String,
    /// Number of stations in the document
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

/// Backend for report and station map documents.
#[async_trait]
pub trait ReportStorage: Send + Sync {
    /// Persist the full validation report.
    async fn write_report(&self, report: &Report) -> Result<WriteSummary>;

    /// Persist the frequency → station map.
    async fn write_station_map(&self, map: &StationMap) -> Result<WriteSummary>;

    /// Load the last stored report, `None` if there is none yet.
    async fn load_report(&self) -> Result<Option<ReportDocument>>;

    /// Load the last stored station map, `None` if there is none yet.
    async fn load_station_map(&self) -> Result<Option<StationMap>>;
}
