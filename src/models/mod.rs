// src/models/mod.rs

//! Domain models for the validation engine.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod candidate;
mod config;
mod outcome;
mod report;

// Re-export all public types
pub use candidate::{Candidate, Catalog};
pub use config::{
    BatchConfig, Config, FrequencyAxis, LoggingConfig, OutputConfig, ProbeConfig,
    RadioBrowserConfig, SourcesConfig,
};
pub use outcome::{ErrorKind, ProbeOutcome, StreamFormat, ValidationResult};
pub use report::{
    FailedStationRecord, Report, ReportDocument, StationEntry, StationMap, StationRecord,
    clean_country, clean_genre, clean_language,
};
