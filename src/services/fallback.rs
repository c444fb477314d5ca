// src/services/fallback.rs

//! Fallback resolution: primary URL first, alternate URL on failure.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::models::{Candidate, ErrorKind, ProbeOutcome, ValidationResult};
use crate::services::Probe;

/// Wraps a [`Probe`] and turns each candidate into a final verdict.
#[derive(Clone)]
pub struct FallbackResolver {
    probe: Arc<dyn Probe>,
}

impl FallbackResolver {
    pub fn new(probe: Arc<dyn Probe>) -> Self {
        Self { probe }
    }

    /// Validate one candidate.
    ///
    /// The fallback URL, when declared, is probed only after the primary
    /// fails and gets a fresh `timeout` of its own. Never fails.
    pub async fn resolve(
        &self,
        candidate: &Candidate,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> ValidationResult {
        let started = Instant::now();

        let primary = match candidate.primary() {
            Some(url) => self.probe.probe(url, timeout, cancel).await,
            None => ProbeOutcome::failed(ErrorKind::Unknown, None, 0),
        };

        if primary.working {
            let elapsed = primary.elapsed_ms;
            return ValidationResult::from_outcome(candidate.clone(), primary, false, elapsed);
        }

        let Some(fallback_url) = candidate.fallback() else {
            let elapsed = primary.elapsed_ms;
            return ValidationResult::from_outcome(candidate.clone(), primary, false, elapsed);
        };

        log::info!(
            "Trying fallback URL for {} after {}",
            candidate.name,
            primary
                .error_kind
                .map(|k| k.label())
                .unwrap_or_else(|| "failure".into())
        );

        let fallback = self.probe.probe(fallback_url, timeout, cancel).await;
        let elapsed = started.elapsed().as_millis() as u64;

        ValidationResult::from_outcome(candidate.clone(), fallback, true, elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StreamFormat;
    use crate::testing::{Script, ScriptedProbe};

    const GOOD: &str = "https://good.example/stream";
    const BAD: &str = "https://bad.example/stream";
    const SLOW: &str = "https://slow.example/stream";
    const SLOW_BACKUP: &str = "https://slow-backup.example/stream";

    fn resolver(probe: &Arc<ScriptedProbe>) -> FallbackResolver {
        FallbackResolver::new(Arc::clone(probe) as Arc<dyn Probe>)
    }

    fn scripted() -> Arc<ScriptedProbe> {
        Arc::new(
            ScriptedProbe::new()
                .with(GOOD, Script::playable(200))
                .with(BAD, Script::http_error(404))
                .with(SLOW, Script::timeout())
                .with(SLOW_BACKUP, Script::timeout()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_working_primary() {
        let probe = scripted();
        let result = resolver(&probe)
            .resolve(
                &Candidate::new("Good", GOOD),
                Duration::from_millis(1000),
                &CancellationToken::new(),
            )
            .await;

        assert!(result.working);
        assert!(!result.used_fallback);
        assert_eq!(result.format, Some(StreamFormat::Mp3));
        assert_eq!(probe.calls(), vec![GOOD.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_rescues_failed_primary() {
        let probe = scripted();
        let candidate = Candidate::new("Rescued", BAD).with_fallback(GOOD);

        let result = resolver(&probe)
            .resolve(&candidate, Duration::from_millis(1000), &CancellationToken::new())
            .await;

        assert!(result.working);
        assert!(result.used_fallback);
        assert_eq!(result.error_kind, None);
        assert_eq!(probe.calls(), vec![BAD.to_string(), GOOD.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_fallback_returns_primary_verbatim() {
        let probe = scripted();
        let result = resolver(&probe)
            .resolve(
                &Candidate::new("Broken", BAD),
                Duration::from_millis(1000),
                &CancellationToken::new(),
            )
            .await;

        assert!(!result.working);
        assert!(!result.used_fallback);
        assert_eq!(result.error_kind, Some(ErrorKind::HttpError { status: 404 }));
        assert_eq!(result.http_status, Some(404));
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_time_out() {
        let probe = scripted();
        let candidate = Candidate::new("Slow", SLOW).with_fallback(SLOW_BACKUP);

        let result = resolver(&probe)
            .resolve(&candidate, Duration::from_millis(500), &CancellationToken::new())
            .await;

        assert!(!result.working);
        assert!(result.used_fallback);
        assert_eq!(result.error_kind, Some(ErrorKind::Timeout));
        // each attempt receives the full budget
        assert!((1000..1010).contains(&result.elapsed_ms));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_without_fallback() {
        let probe = scripted();
        let result = resolver(&probe)
            .resolve(
                &Candidate::new("Slow", SLOW),
                Duration::from_millis(500),
                &CancellationToken::new(),
            )
            .await;

        assert!(!result.working);
        assert!(!result.used_fallback);
        assert_eq!(result.error_kind, Some(ErrorKind::Timeout));
        assert!((500..510).contains(&result.elapsed_ms));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_error_wins() {
        let probe = scripted();
        let candidate = Candidate::new("Mixed", SLOW).with_fallback(BAD);

        let result = resolver(&probe)
            .resolve(&candidate, Duration::from_millis(500), &CancellationToken::new())
            .await;

        assert!(result.used_fallback);
        assert_eq!(result.error_kind, Some(ErrorKind::HttpError { status: 404 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_primary_goes_straight_to_fallback() {
        let probe = scripted();
        let candidate = Candidate::new("Backup only", "").with_fallback(GOOD);

        let result = resolver(&probe)
            .resolve(&candidate, Duration::from_millis(500), &CancellationToken::new())
            .await;

        assert!(result.working);
        assert!(result.used_fallback);
        assert_eq!(probe.calls(), vec![GOOD.to_string()]);
    }
}
