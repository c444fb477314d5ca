// src/models/report.rs

//! Report values and their persisted JSON documents.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Candidate, StreamFormat, ValidationResult};

/// Aggregate over all validation results of one run.
#[derive(Debug, Clone)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub total_tested: usize,
    pub duplicates_dropped: usize,
    pub working: Vec<ValidationResult>,
    pub failed: Vec<ValidationResult>,
    /// `working / total_tested`, defined as 0 for an empty run
    pub success_ratio: f64,
}

impl Report {
    /// Success ratio as a percentage string with one decimal, e.g. `"67.8%"`.
    pub fn success_rate(&self) -> String {
        format!("{:.1}%", self.success_ratio * 100.0)
    }

    /// Failure ratio, 0 for an empty run.
    pub fn failure_ratio(&self) -> f64 {
        if self.total_tested == 0 {
            0.0
        } else {
            self.failed.len() as f64 / self.total_tested as f64
        }
    }
}

/// A working station as persisted in the report document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationRecord {
    #[serde(flatten)]
    pub station: Candidate,
    pub response_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub used_fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<StreamFormat>,
}

/// A failed station as persisted in the report document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedStationRecord {
    #[serde(flatten)]
    pub station: Candidate,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub used_fallback: bool,
}

/// Persisted form of a [`Report`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    pub timestamp: DateTime<Utc>,
    pub total_tested: usize,
    pub working: usize,
    pub failed: usize,
    pub success_rate: String,
    #[serde(default)]
    pub duplicates_dropped: usize,
    pub working_stations: Vec<StationRecord>,
    pub failed_stations: Vec<FailedStationRecord>,
}

impl From<&Report> for ReportDocument {
    fn from(report: &Report) -> Self {
        Self {
            timestamp: report.generated_at,
            total_tested: report.total_tested,
            working: report.working.len(),
            failed: report.failed.len(),
            success_rate: report.success_rate(),
            duplicates_dropped: report.duplicates_dropped,
            working_stations: report
                .working
                .iter()
                .map(|r| StationRecord {
                    station: r.candidate.clone(),
                    response_time: r.elapsed_ms,
                    status_code: r.http_status,
                    used_fallback: r.used_fallback,
                    format: r.format,
                })
                .collect(),
            failed_stations: report
                .failed
                .iter()
                .map(|r| FailedStationRecord {
                    station: r.candidate.clone(),
                    error: r.error_kind.map(|k| k.label()).unwrap_or_default(),
                    status_code: r.http_status,
                    used_fallback: r.used_fallback,
                })
                .collect(),
        }
    }
}

/// Tuner-facing station fields placed on one frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationEntry {
    pub name: String,
    pub url: String,
    pub fallback_url: Option<String>,
    pub genre: String,
    pub country: String,
    pub language: String,
}

impl From<&Candidate> for StationEntry {
    fn from(station: &Candidate) -> Self {
        Self {
            name: station.name.trim().to_string(),
            url: station.url.clone(),
            fallback_url: station.fallback().map(str::to_string),
            genre: clean_genre(&station.genre),
            country: clean_country(&station.country),
            language: clean_language(&station.language),
        }
    }
}

/// Frequency (kHz) to station mapping, ascending by frequency.
pub type StationMap = BTreeMap<u32, StationEntry>;

fn is_unknown(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == "Unknown"
}

/// Empty or unknown genres display as "Variety".
pub fn clean_genre(genre: &str) -> String {
    if is_unknown(genre) {
        "Variety".into()
    } else {
        genre.trim().to_string()
    }
}

/// Shorten official country names; unknown countries display as "International".
pub fn clean_country(country: &str) -> String {
    if is_unknown(country) {
        return "International".into();
    }
    let country = country.trim();
    match country {
        "The United States Of America" => "USA",
        "The Russian Federation" => "Russia",
        "The United Kingdom Of Great Britain And Northern Ireland" => "UK",
        "The Netherlands" => "Netherlands",
        "Islamic Republic Of Iran" => "Iran",
        other => other,
    }
    .to_string()
}

/// Capitalize the first letter, lower-case the rest.
pub fn clean_language(language: &str) -> String {
    if is_unknown(language) {
        return "Unknown".into();
    }
    let mut chars = language.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorKind;

    fn result(name: &str, working: bool) -> ValidationResult {
        ValidationResult {
            candidate: Candidate::new(name, format!("https://{name}.example/stream")),
            working,
            error_kind: (!working).then_some(ErrorKind::HttpError { status: 404 }),
            http_status: Some(if working { 200 } else { 404 }),
            elapsed_ms: 120,
            used_fallback: false,
            format: working.then_some(StreamFormat::Mp3),
        }
    }

    #[test]
    fn test_clean_fields() {
        assert_eq!(clean_genre(""), "Variety");
        assert_eq!(clean_genre("Unknown"), "Variety");
        assert_eq!(clean_genre("jazz, swing"), "jazz, swing");
        assert_eq!(clean_country("The Russian Federation"), "Russia");
        assert_eq!(clean_country("Unknown"), "International");
        assert_eq!(clean_country("France"), "France");
        assert_eq!(clean_language("ENGLISH"), "English");
        assert_eq!(clean_language(""), "Unknown");
    }

    #[test]
    fn test_station_entry_from_candidate() {
        let mut c = Candidate::new("  Radio X ", "https://x.example/mp3")
            .with_fallback("https://x.example/aac");
        c.country = "The United States Of America".into();
        let entry = StationEntry::from(&c);
        assert_eq!(entry.name, "Radio X");
        assert_eq!(entry.country, "USA");
        assert_eq!(entry.genre, "Variety");
        assert_eq!(entry.fallback_url.as_deref(), Some("https://x.example/aac"));
    }

    #[test]
    fn test_document_shape() {
        let report = Report {
            generated_at: Utc::now(),
            total_tested: 2,
            duplicates_dropped: 1,
            working: vec![result("good", true)],
            failed: vec![result("bad", false)],
            success_ratio: 0.5,
        };
        let doc = ReportDocument::from(&report);
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["totalTested"], 2);
        assert_eq!(value["successRate"], "50.0%");
        assert_eq!(value["workingStations"][0]["name"], "good");
        assert_eq!(value["workingStations"][0]["responseTime"], 120);
        assert_eq!(value["failedStations"][0]["error"], "HTTP 404");

        let back: ReportDocument = serde_json::from_value(value).unwrap();
        assert_eq!(back.working_stations[0].station.url, "https://good.example/stream");
    }

    #[test]
    fn test_failure_ratio_empty() {
        let report = Report {
            generated_at: Utc::now(),
            total_tested: 0,
            duplicates_dropped: 0,
            working: vec![],
            failed: vec![],
            success_ratio: 0.0,
        };
        assert_eq!(report.failure_ratio(), 0.0);
        assert_eq!(report.success_rate(), "0.0%");
    }
}
