// src/models/outcome.rs

//! Probe outcomes and per-candidate verdicts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Candidate;

/// Why a probe did not confirm a playable stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ErrorKind {
    /// No response or no ready signal within the budget
    Timeout,
    /// Connection failure, or the body stream broke while loading
    Network,
    /// Server answered outside the 2xx–3xx range
    HttpError { status: u16 },
    /// Media bytes arrived but matched no known format
    Decode,
    /// The resource is not a media stream
    FormatUnsupported,
    /// The probe's cancellation token fired
    Aborted,
    /// Anything else ("load failed")
    Unknown,
}

impl ErrorKind {
    /// Short label used in reports and console output.
    pub fn label(&self) -> String {
        match self {
            ErrorKind::Timeout => "Request timeout".into(),
            ErrorKind::Network => "Network error".into(),
            ErrorKind::HttpError { status } => format!("HTTP {status}"),
            ErrorKind::Decode => "Media decode error".into(),
            ErrorKind::FormatUnsupported => "Media format not supported".into(),
            ErrorKind::Aborted => "Aborted".into(),
            ErrorKind::Unknown => "Load failed".into(),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Container or codec recognised in the first bytes of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamFormat {
    Mp3,
    Aac,
    Ogg,
    Flac,
    Mp4,
    Wav,
    MpegTs,
}

/// Result of one probe attempt against one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub working: bool,
    pub error_kind: Option<ErrorKind>,
    pub http_status: Option<u16>,
    pub elapsed_ms: u64,
    pub content_type: Option<String>,
    pub format: Option<StreamFormat>,
}

impl ProbeOutcome {
    /// A confirmed playable stream.
    pub fn playable(format: StreamFormat, http_status: Option<u16>, elapsed_ms: u64) -> Self {
        Self {
            working: true,
            error_kind: None,
            http_status,
            elapsed_ms,
            content_type: None,
            format: Some(format),
        }
    }

    /// A failed probe.
    pub fn failed(kind: ErrorKind, http_status: Option<u16>, elapsed_ms: u64) -> Self {
        Self {
            working: false,
            error_kind: Some(kind),
            http_status,
            elapsed_ms,
            content_type: None,
            format: None,
        }
    }
}

/// Final verdict for one candidate after primary and fallback attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub candidate: Candidate,
    pub working: bool,
    pub error_kind: Option<ErrorKind>,
    pub http_status: Option<u16>,
    pub elapsed_ms: u64,
    pub used_fallback: bool,
    pub format: Option<StreamFormat>,
}

impl ValidationResult {
    /// Build a verdict from the outcome of the last probe that ran.
    pub fn from_outcome(
        candidate: Candidate,
        outcome: ProbeOutcome,
        used_fallback: bool,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            candidate,
            working: outcome.working,
            error_kind: outcome.error_kind,
            http_status: outcome.http_status,
            elapsed_ms,
            used_fallback,
            format: outcome.format,
        }
    }

    /// Verdict for a candidate that was never probed.
    pub fn aborted(candidate: Candidate) -> Self {
        Self {
            candidate,
            working: false,
            error_kind: Some(ErrorKind::Aborted),
            http_status: None,
            elapsed_ms: 0,
            used_fallback: false,
            format: None,
        }
    }
}
