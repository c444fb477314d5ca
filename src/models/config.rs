//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP probing behavior
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Window size and cooldown
    #[serde(default)]
    pub batch: BatchConfig,

    /// Frequency axis for the station map
    #[serde(default)]
    pub frequency: FrequencyAxis,

    /// Where candidates come from
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Output artifacts
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, falling back to defaults only when the file is absent.
    ///
    /// An unreadable or malformed file is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match Self::load(&path) {
            Err(AppError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {:?}. Using defaults.", path.as_ref());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.probe.user_agent.trim().is_empty() {
            return Err(AppError::validation("probe.user_agent is empty"));
        }
        if self.probe.timeout_ms == 0 {
            return Err(AppError::validation("probe.timeout_ms must be > 0"));
        }
        if self.probe.sniff_bytes == 0 {
            return Err(AppError::validation("probe.sniff_bytes must be > 0"));
        }
        if self.batch.size == 0 {
            return Err(AppError::validation("batch.size must be > 0"));
        }
        if self.frequency.step == 0 {
            return Err(AppError::validation("frequency.step must be > 0"));
        }
        if self.frequency.start > self.frequency.end {
            return Err(AppError::validation(
                "frequency.start must not exceed frequency.end",
            ));
        }
        if self.sources.radio_browser.enabled {
            url::Url::parse(&self.sources.radio_browser.base_url)?;
        }
        if self.output.report_file.trim().is_empty()
            || self.output.station_map_file.trim().is_empty()
        {
            return Err(AppError::config("output file names must not be empty"));
        }
        Ok(())
    }
}

/// HTTP probe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Budget for each probe phase in milliseconds
    #[serde(default = "defaults::timeout_ms")]
    pub timeout_ms: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Bytes read at most while waiting for a recognisable payload
    #[serde(default = "defaults::sniff_bytes")]
    pub sniff_bytes: usize,

    #[serde(default = "defaults::max_redirects")]
    pub max_redirects: usize,
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: defaults::timeout_ms(),
            user_agent: defaults::user_agent(),
            sniff_bytes: defaults::sniff_bytes(),
            max_redirects: defaults::max_redirects(),
        }
    }
}

/// Batch scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Candidates probed concurrently per window
    #[serde(default = "defaults::batch_size")]
    pub size: usize,

    /// Idle delay between windows in milliseconds
    #[serde(default = "defaults::batch_delay_ms")]
    pub delay_ms: u64,
}

impl BatchConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: defaults::batch_size(),
            delay_ms: defaults::batch_delay_ms(),
        }
    }
}

/// Inclusive frequency range in kHz, walked in `step` increments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyAxis {
    #[serde(default = "defaults::freq_start")]
    pub start: u32,
    #[serde(default = "defaults::freq_end")]
    pub end: u32,
    #[serde(default = "defaults::freq_step")]
    pub step: u32,
}

impl FrequencyAxis {
    /// All frequencies on the axis, ascending.
    pub fn values(&self) -> Vec<u32> {
        if self.step == 0 || self.start > self.end {
            return Vec::new();
        }
        (self.start..=self.end).step_by(self.step as usize).collect()
    }
}

impl Default for FrequencyAxis {
    fn default() -> Self {
        Self {
            start: defaults::freq_start(),
            end: defaults::freq_end(),
            step: defaults::freq_step(),
        }
    }
}

/// Candidate source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Catalog file, relative to the storage directory
    #[serde(default = "defaults::catalog_file")]
    pub catalog_file: String,

    #[serde(default)]
    pub radio_browser: RadioBrowserConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            catalog_file: defaults::catalog_file(),
            radio_browser: RadioBrowserConfig::default(),
        }
    }
}

/// Radio Browser directory API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadioBrowserConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "defaults::radio_browser_url")]
    pub base_url: String,

    /// Maximum stations requested
    #[serde(default = "defaults::radio_browser_limit")]
    pub limit: usize,
}

impl Default for RadioBrowserConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: defaults::radio_browser_url(),
            limit: defaults::radio_browser_limit(),
        }
    }
}

/// Output artifact settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "defaults::report_file")]
    pub report_file: String,

    #[serde(default = "defaults::station_map_file")]
    pub station_map_file: String,

    /// Failed stations listed individually in the console summary
    #[serde(default = "defaults::failed_preview")]
    pub failed_preview: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_file: defaults::report_file(),
            station_map_file: defaults::station_map_file(),
            failed_preview: defaults::failed_preview(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log progress after every window
    #[serde(default = "defaults::show_progress")]
    pub show_progress: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            show_progress: defaults::show_progress(),
        }
    }
}

mod defaults {
    // Probe defaults
    pub fn timeout_ms() -> u64 {
        8000
    }
    pub fn user_agent() -> String {
        "stationcheck/0.1".into()
    }
    pub fn sniff_bytes() -> usize {
        16 * 1024
    }
    pub fn max_redirects() -> usize {
        10
    }

    // Batch defaults
    pub fn batch_size() -> usize {
        10
    }
    pub fn batch_delay_ms() -> u64 {
        500
    }

    // Full AM band
    pub fn freq_start() -> u32 {
        530
    }
    pub fn freq_end() -> u32 {
        1700
    }
    pub fn freq_step() -> u32 {
        10
    }

    // Source defaults
    pub fn catalog_file() -> String {
        "catalog.toml".into()
    }
    pub fn radio_browser_url() -> String {
        "https://de1.api.radio-browser.info".into()
    }
    pub fn radio_browser_limit() -> usize {
        200
    }

    // Output defaults
    pub fn report_file() -> String {
        "radio-validation-results.json".into()
    }
    pub fn station_map_file() -> String {
        "station-map.json".into()
    }
    pub fn failed_preview() -> usize {
        20
    }

    pub fn show_progress() -> bool {
        true
    }
}
