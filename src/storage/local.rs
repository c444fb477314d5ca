//! Local filesystem storage implementation.
//!
//! Every document is written to a sibling `.tmp` file first and then renamed
//! over the target, so readers never observe a half-written file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{OutputConfig, Report, ReportDocument, StationMap};
use crate::storage::{ReportStorage, WriteSummary};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    report_file: String,
    station_map_file: String,
}

impl LocalStorage {
    /// Create a LocalStorage rooted at the given directory with default file names.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self::with_output(root_dir, &OutputConfig::default())
    }

    /// Create a LocalStorage using the file names from `[output]`.
    pub fn with_output(root_dir: impl Into<PathBuf>, output: &OutputConfig) -> Self {
        Self {
            root_dir: root_dir.into(),
            report_file: output.report_file.clone(),
            station_map_file: output.station_map_file.clone(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<PathBuf> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ReportStorage for LocalStorage {
    async fn write_report(&self, report: &Report) -> Result<WriteSummary> {
        let document = ReportDocument::from(report);
        let path = self.write_json(&self.report_file, &document).await?;
        log::info!(
            "Report with {} stations written to {}",
            document.total_tested,
            path.display()
        );

        Ok(WriteSummary {
            location: path.display().to_string(),
            count: document.total_tested,
            timestamp: Utc::now(),
        })
    }

    async fn write_station_map(&self, map: &StationMap) -> Result<WriteSummary> {
        let path = self.write_json(&self.station_map_file, map).await?;
        log::info!("Station map with {} entries written to {}", map.len(), path.display());

        Ok(WriteSummary {
            location: path.display().to_string(),
            count: map.len(),
            timestamp: Utc::now(),
        })
    }

    async fn load_report(&self) -> Result<Option<ReportDocument>> {
        let report = self.read_json(&self.report_file).await?;
        if report.is_none() {
            log::warn!("No report found at {}", self.path(&self.report_file).display());
        }
        Ok(report)
    }

    async fn load_station_map(&self) -> Result<Option<StationMap>> {
        self.read_json(&self.station_map_file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, StationEntry, ValidationResult};
    use crate::pipeline::aggregate;
    use tempfile::TempDir;

    fn result(name: &str, working: bool) -> ValidationResult {
        ValidationResult {
            candidate: Candidate::new(name, format!("https://{name}.example/stream"))
                .with_fallback(format!("https://{name}-backup.example/stream")),
            working,
            error_kind: (!working).then_some(crate::models::ErrorKind::Network),
            http_status: working.then_some(200),
            elapsed_ms: 75,
            used_fallback: !working,
            format: None,
        }
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.write_bytes("nested/test.txt", b"hello").await.unwrap();
        let data = storage.read_bytes("nested/test.txt").await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
        assert!(!tmp.path().join("nested/test.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert!(storage.read_bytes("nope.txt").await.unwrap().is_none());
        assert!(storage.load_report().await.unwrap().is_none());
        assert!(storage.load_station_map().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_report_round_trip() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let report = aggregate(vec![result("a", true), result("b", false)], 1);

        let summary = storage.write_report(&report).await.unwrap();
        assert_eq!(summary.count, 2);
        assert!(tmp.path().join("radio-validation-results.json").exists());

        let loaded = storage.load_report().await.unwrap().unwrap();
        assert_eq!(loaded.total_tested, 2);
        assert_eq!(loaded.success_rate, "50.0%");
        assert_eq!(loaded.duplicates_dropped, 1);
        assert_eq!(loaded.working_stations[0].station.name, "a");
        assert_eq!(loaded.failed_stations[0].error, "Network error");
        assert!(loaded.failed_stations[0].used_fallback);
    }

    #[tokio::test]
    async fn test_station_map_uses_configured_name() {
        let tmp = TempDir::new().unwrap();
        let output = OutputConfig {
            station_map_file: "out/map.json".into(),
            ..OutputConfig::default()
        };
        let storage = LocalStorage::with_output(tmp.path(), &output);

        let mut map = StationMap::new();
        map.insert(530, StationEntry::from(&result("a", true).candidate));
        storage.write_station_map(&map).await.unwrap();

        let raw = std::fs::read_to_string(tmp.path().join("out/map.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["530"]["name"], "a");
        assert_eq!(json["530"]["fallbackUrl"], "https://a-backup.example/stream");

        let loaded = storage.load_station_map().await.unwrap().unwrap();
        assert_eq!(loaded, map);
    }
}
