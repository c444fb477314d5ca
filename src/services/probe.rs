// src/services/probe.rs

//! Two-phase stream probe.
//!
//! 1. **Transport**: a `HEAD` request. Any 2xx–3xx answer is reachable.
//! 2. **Playability**: a streamed `GET` whose leading bytes must match a
//!    known stream format. Its timeout clock starts when loading begins,
//!    so a slow transport phase does not eat into it.
//!
//! Each phase resolves on whichever comes first: its ready signal, an error,
//! its timeout, or the caller's cancellation token. Requests, body streams
//! and timers live inside the phase future and are dropped on every path,
//! so a probe that timed out can never resolve later.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use reqwest::{Client, StatusCode};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::models::{ErrorKind, ProbeConfig, ProbeOutcome, StreamFormat};
use crate::services::sniff::{ContentClass, classify_content_type, is_playlist, sniff};
use crate::utils::http::create_async_client;

const ACCEPT_AUDIO: &str = "audio/*,*/*;q=0.1";

/// A reachability and playability check against one URL.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Probe `url`, spending at most `timeout` per phase.
    ///
    /// Never fails: every problem is reported inside the outcome.
    async fn probe(&self, url: &str, timeout: Duration, cancel: &CancellationToken)
    -> ProbeOutcome;
}

/// Progress of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeState {
    Pending,
    TransportOk {
        status: u16,
    },
    PlayableConfirmed {
        status: Option<u16>,
        format: StreamFormat,
        content_type: Option<String>,
    },
    Failed {
        kind: ErrorKind,
        status: Option<u16>,
        content_type: Option<String>,
    },
}

impl ProbeState {
    fn failed(kind: ErrorKind, status: Option<u16>) -> Self {
        Self::Failed {
            kind,
            status,
            content_type: None,
        }
    }

    /// Whether the probe has reached a final state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::PlayableConfirmed { .. } | Self::Failed { .. })
    }

    /// Turn a terminal state into an outcome.
    fn into_outcome(self, elapsed_ms: u64) -> ProbeOutcome {
        match self {
            Self::PlayableConfirmed {
                status,
                format,
                content_type,
            } => ProbeOutcome {
                content_type,
                ..ProbeOutcome::playable(format, status, elapsed_ms)
            },
            Self::Failed {
                kind,
                status,
                content_type,
            } => ProbeOutcome {
                content_type,
                ..ProbeOutcome::failed(kind, status, elapsed_ms)
            },
            // Non-terminal states never escape `HttpProbe::probe`.
            Self::Pending | Self::TransportOk { .. } => {
                ProbeOutcome::failed(ErrorKind::Unknown, None, elapsed_ms)
            }
        }
    }
}

/// Probe backed by a real HTTP client.
#[derive(Clone)]
pub struct HttpProbe {
    client: Client,
    sniff_limit: usize,
}

impl HttpProbe {
    /// Create a probe from configuration.
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        Ok(Self::with_client(create_async_client(config)?, config.sniff_bytes))
    }

    /// Create a probe around an existing client.
    pub fn with_client(client: Client, sniff_limit: usize) -> Self {
        Self {
            client,
            sniff_limit: sniff_limit.max(1),
        }
    }

    /// Phase 1: metadata-only request.
    async fn transport(
        &self,
        url: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> ProbeState {
        let request = self.client.head(url).header(ACCEPT, ACCEPT_AUDIO).send();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => ProbeState::failed(ErrorKind::Aborted, None),
            result = tokio::time::timeout(timeout, request) => match result {
                Err(_) => ProbeState::failed(ErrorKind::Timeout, None),
                Ok(Err(e)) => ProbeState::failed(classify_request_error(&e), None),
                Ok(Ok(response)) => {
                    let status = response.status();
                    if is_reachable(status) {
                        ProbeState::TransportOk { status: status.as_u16() }
                    } else {
                        ProbeState::failed(
                            ErrorKind::HttpError { status: status.as_u16() },
                            Some(status.as_u16()),
                        )
                    }
                }
            },
        }
    }

    /// Phase 2: open the stream and wait for a recognisable payload.
    async fn playability(
        &self,
        url: &str,
        transport_status: u16,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> ProbeState {
        let deadline = Instant::now() + timeout;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                ProbeState::failed(ErrorKind::Aborted, Some(transport_status))
            }
            result = tokio::time::timeout_at(deadline, self.load(url, transport_status)) => {
                result.unwrap_or_else(|_| {
                    ProbeState::failed(ErrorKind::Timeout, Some(transport_status))
                })
            }
        }
    }

    async fn load(&self, url: &str, transport_status: u16) -> ProbeState {
        let mut response = match self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_AUDIO)
            .header("Icy-MetaData", "0")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return ProbeState::failed(classify_request_error(&e), Some(transport_status));
            }
        };

        let status = response.status();
        if !status.is_success() {
            return ProbeState::failed(
                ErrorKind::HttpError { status: status.as_u16() },
                Some(status.as_u16()),
            );
        }

        let content_type = header_str(response.headers());
        let class = classify_content_type(content_type.as_deref());
        let mut buffer: Vec<u8> = Vec::new();

        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    buffer.extend_from_slice(&chunk);
                    if is_playlist(&buffer) {
                        break;
                    }
                    if let Some(format) = sniff(&buffer, class) {
                        return ProbeState::PlayableConfirmed {
                            status: Some(transport_status),
                            format,
                            content_type,
                        };
                    }
                    if buffer.len() >= self.sniff_limit {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let kind = if e.is_timeout() {
                        ErrorKind::Timeout
                    } else {
                        ErrorKind::Network
                    };
                    return ProbeState::Failed {
                        kind,
                        status: Some(transport_status),
                        content_type,
                    };
                }
            }
        }

        ProbeState::Failed {
            kind: unplayable_kind(&buffer, class),
            status: Some(transport_status),
            content_type,
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(
        &self,
        url: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> ProbeOutcome {
        let started = Instant::now();
        let mut state = ProbeState::Pending;

        while !state.is_terminal() {
            state = match state {
                ProbeState::Pending => self.transport(url, timeout, cancel).await,
                ProbeState::TransportOk { status } => {
                    self.playability(url, status, timeout, cancel).await
                }
                terminal => terminal,
            };
        }

        let outcome = state.into_outcome(started.elapsed().as_millis() as u64);
        if let Some(kind) = outcome.error_kind {
            log::debug!("Probe failed for {}: {} ({}ms)", url, kind, outcome.elapsed_ms);
        }
        outcome
    }
}

/// 2xx and 3xx answers count as reachable.
fn is_reachable(status: StatusCode) -> bool {
    status.is_success() || status.is_redirection()
}

fn classify_request_error(error: &reqwest::Error) -> ErrorKind {
    if error.is_timeout() {
        ErrorKind::Timeout
    } else if error.is_builder() {
        ErrorKind::Unknown
    } else {
        ErrorKind::Network
    }
}

fn header_str(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Classify a payload that never matched a known format.
///
/// Playlists are not followed, so a playlist body is never playable itself.
fn unplayable_kind(buffer: &[u8], class: ContentClass) -> ErrorKind {
    if buffer.is_empty() {
        return ErrorKind::Unknown;
    }
    if is_playlist(buffer) {
        return ErrorKind::FormatUnsupported;
    }
    match class {
        ContentClass::Media => ErrorKind::Decode,
        ContentClass::Playlist | ContentClass::NonMedia | ContentClass::Unknown => {
            ErrorKind::FormatUnsupported
        }
    }
}
