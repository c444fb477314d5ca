//! Test doubles shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::models::{ErrorKind, ProbeOutcome, StreamFormat};
use crate::services::Probe;

#[derive(Debug, Clone, Copy)]
enum Verdict {
    Playable(u16),
    Fail(ErrorKind, Option<u16>),
    Timeout,
}

/// Scripted answer for one URL.
#[derive(Debug, Clone, Copy)]
pub struct Script {
    delay: Duration,
    verdict: Verdict,
}

impl Script {
    pub fn playable(status: u16) -> Self {
        Self {
            delay: Duration::ZERO,
            verdict: Verdict::Playable(status),
        }
    }

    pub fn http_error(status: u16) -> Self {
        Self {
            delay: Duration::ZERO,
            verdict: Verdict::Fail(ErrorKind::HttpError { status }, Some(status)),
        }
    }

    pub fn fail(kind: ErrorKind) -> Self {
        Self {
            delay: Duration::ZERO,
            verdict: Verdict::Fail(kind, None),
        }
    }

    /// Never answers; resolves when the probe's own timeout expires.
    pub fn timeout() -> Self {
        Self {
            delay: Duration::ZERO,
            verdict: Verdict::Timeout,
        }
    }

    /// Resolve only after `ms` milliseconds.
    pub fn after(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }
}

/// In-memory [`Probe`] that answers from a script and records its calls.
#[derive(Default)]
pub struct ScriptedProbe {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, script: Script) -> Self {
        self.scripts.insert(url.to_string(), script);
        self
    }

    /// URLs probed, in launch order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// Launch instants, in launch order.
    pub fn launches(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of probes observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn probe(
        &self,
        url: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> ProbeOutcome {
        let started = Instant::now();
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), started));
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let script = self
            .scripts
            .get(url)
            .copied()
            .unwrap_or(Script::fail(ErrorKind::Network));

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => ProbeOutcome::failed(ErrorKind::Aborted, None, 0),
            outcome = async {
                match script.verdict {
                    Verdict::Timeout => {
                        tokio::time::sleep(timeout).await;
                        ProbeOutcome::failed(ErrorKind::Timeout, None, 0)
                    }
                    Verdict::Playable(status) => {
                        tokio::time::sleep(script.delay).await;
                        ProbeOutcome::playable(StreamFormat::Mp3, Some(status), 0)
                    }
                    Verdict::Fail(kind, status) => {
                        tokio::time::sleep(script.delay).await;
                        ProbeOutcome::failed(kind, status, 0)
                    }
                }
            } => outcome,
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        ProbeOutcome {
            elapsed_ms: started.elapsed().as_millis() as u64,
            ..outcome
        }
    }
}

/// `n` chained MPEG-1 Layer III frames (128 kbps, 44.1 kHz, 417 bytes each).
pub fn mp3_frames(n: usize) -> Vec<u8> {
    let mut frame = vec![0u8; 417];
    frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
    frame.repeat(n)
}

/// `n` chained ADTS frames of 64 bytes each.
pub fn adts_frames(n: usize) -> Vec<u8> {
    let mut frame = vec![0u8; 64];
    frame[..7].copy_from_slice(&[0xFF, 0xF1, 0x50, 0x80, 0x08, 0x1F, 0xFC]);
    frame.repeat(n)
}

/// Deterministic pseudo-random bytes (xorshift32).
pub fn noise(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}
