// src/pipeline/schedule.rs

//! Windowed batch scheduling.
//!
//! Candidates are split into consecutive windows of at most `batch_size`.
//! Every candidate in a window is resolved concurrently, the window is joined,
//! and the scheduler idles for `inter_batch_delay` before the next one.
//!
//! Two tokens control shutdown:
//! - `stop` halts launching new windows, including during the idle delay.
//!   Probes already in flight run to completion.
//! - `abort` is forwarded to in-flight probes, which then report `Aborted`.

use std::ops::Range;
use std::time::Duration;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::models::{BatchConfig, Candidate, ProbeConfig, ValidationResult};
use crate::services::FallbackResolver;

/// Progress snapshot emitted after each window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// 1-based index of the window just finished
    pub window: usize,
    pub window_count: usize,
    /// Candidates resolved so far
    pub tested: usize,
    pub total: usize,
    /// Working candidates so far
    pub working: usize,
}

/// Runs the resolver over candidates in fixed-size windows.
pub struct BatchScheduler {
    resolver: FallbackResolver,
    batch_size: usize,
    inter_batch_delay: Duration,
    probe_timeout: Duration,
    stop: CancellationToken,
    abort: CancellationToken,
}

impl BatchScheduler {
    pub fn new(
        resolver: FallbackResolver,
        batch_size: usize,
        inter_batch_delay: Duration,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            batch_size: batch_size.max(1),
            inter_batch_delay,
            probe_timeout,
            stop: CancellationToken::new(),
            abort: CancellationToken::new(),
        }
    }

    /// Build a scheduler from the `[batch]` and `[probe]` sections.
    pub fn from_config(
        resolver: FallbackResolver,
        batch: &BatchConfig,
        probe: &ProbeConfig,
    ) -> Self {
        Self::new(resolver, batch.size, batch.delay(), probe.timeout())
    }

    /// Use an external token to stop launching windows.
    pub fn with_stop_token(mut self, stop: CancellationToken) -> Self {
        self.stop = stop;
        self
    }

    /// Use an external token to abort in-flight probes.
    pub fn with_abort_token(mut self, abort: CancellationToken) -> Self {
        self.abort = abort;
        self
    }

    /// Token that stops the scheduler from launching further windows.
    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    /// Resolve every candidate, preserving input order.
    ///
    /// Returns exactly one result per candidate. Candidates whose window
    /// was never launched are reported as `Aborted`.
    pub async fn run<F>(
        &self,
        candidates: &[Candidate],
        mut on_progress: F,
    ) -> Vec<ValidationResult>
    where
        F: FnMut(&BatchProgress),
    {
        let total = candidates.len();
        let ranges = windows(total, self.batch_size);
        let window_count = ranges.len();

        let mut results: Vec<ValidationResult> = Vec::with_capacity(total);
        let mut working = 0;

        for (index, range) in ranges.into_iter().enumerate() {
            if index > 0 && !self.inter_batch_delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = self.stop.cancelled() => {}
                    _ = tokio::time::sleep(self.inter_batch_delay) => {}
                }
            }

            if self.stop.is_cancelled() {
                log::warn!(
                    "Stop requested: {} of {} candidates left unprobed",
                    total - results.len(),
                    total
                );
                break;
            }

            let window = &candidates[range];
            let batch = join_all(
                window
                    .iter()
                    .map(|c| self.resolver.resolve(c, self.probe_timeout, &self.abort)),
            )
            .await;

            working += batch.iter().filter(|r| r.working).count();
            results.extend(batch);

            let progress = BatchProgress {
                window: index + 1,
                window_count,
                tested: results.len(),
                total,
                working,
            };
            log::debug!(
                "Window {}/{}: {}/{} tested, {} working",
                progress.window,
                progress.window_count,
                progress.tested,
                progress.total,
                progress.working
            );
            on_progress(&progress);
        }

        let launched = results.len();
        results.extend(
            candidates[launched..]
                .iter()
                .cloned()
                .map(ValidationResult::aborted),
        );
        results
    }
}

/// Split `len` items into consecutive ranges of at most `size`.
pub fn windows(len: usize, size: usize) -> Vec<Range<usize>> {
    let size = size.max(1);
    (0..len)
        .step_by(size)
        .map(|start| start..(start + size).min(len))
        .collect()
}
