// src/pipeline/run.rs

//! End-to-end validation run.

use crate::error::{AppError, Result};
use crate::models::{Candidate, Config, Report, StationMap};
use crate::storage::ReportStorage;
use crate::utils::console;

use super::aggregate::{aggregate, assign_frequencies, build_frequency_map};
use super::breakdown::{BreakdownKey, breakdown};
use super::dedupe::dedupe;
use super::schedule::BatchScheduler;

const BREAKDOWN_LIMIT: usize = 10;

/// Validate candidates and persist the report and station map.
pub async fn run_validation(
    config: &Config,
    candidates: &[Candidate],
    scheduler: &BatchScheduler,
    storage: &dyn ReportStorage,
) -> Result<Report> {
    console::header("Radio Stream Validation");

    console::step(1, 4, "Dedupe - Collapsing duplicate endpoints");
    let unique = dedupe(candidates);
    let duplicates_dropped = candidates.len() - unique.len();
    console::sub_item(&format!(
        "{} candidates, {} duplicates dropped",
        unique.len(),
        duplicates_dropped
    ));

    console::step(2, 4, "Probe - Checking reachability and playability");
    let show_progress = config.logging.show_progress;
    let results = scheduler
        .run(&unique, |p| {
            if show_progress {
                console::sub_item(&format!(
                    "Batch {}/{}: {}/{} tested ({}), {} working",
                    p.window,
                    p.window_count,
                    p.tested,
                    p.total,
                    console::percent(p.tested, p.total),
                    p.working
                ));
            }
        })
        .await;

    console::step(3, 4, "Aggregate - Building report and station map");
    let station_map = build_frequency_map(&results, &config.frequency.values());
    let report = aggregate(results, duplicates_dropped);

    console::step(4, 4, "Store - Writing artifacts");
    let report_summary = storage.write_report(&report).await?;
    let map_summary = storage.write_station_map(&station_map).await?;
    console::sub_item(&format!("Report: {}", report_summary.location));
    console::sub_item(&format!(
        "Station map: {} ({} frequencies)",
        map_summary.location, map_summary.count
    ));

    print_report(&report, config.output.failed_preview);

    Ok(report)
}

/// Rebuild the station map from the stored report without probing.
pub async fn rebuild_station_map(
    config: &Config,
    storage: &dyn ReportStorage,
) -> Result<StationMap> {
    let Some(report) = storage.load_report().await? else {
        return Err(AppError::config("No stored report. Run 'run' first."));
    };

    let map = assign_frequencies(
        report.working_stations.iter().map(|s| &s.station),
        &config.frequency.values(),
    );

    storage.write_station_map(&map).await?;
    Ok(map)
}

/// Console summary of a finished run.
fn print_report(report: &Report, failed_preview: usize) {
    console::summary(
        "Validation",
        &[
            ("Total tested", report.total_tested.to_string()),
            ("Duplicates dropped", report.duplicates_dropped.to_string()),
            (
                "Working",
                format!("{} ({})", report.working.len(), report.success_rate()),
            ),
            (
                "Failed",
                format!(
                    "{} ({:.1}%)",
                    report.failed.len(),
                    report.failure_ratio() * 100.0
                ),
            ),
        ],
    );

    for result in &report.working {
        let fallback = if result.used_fallback { " [fallback]" } else { "" };
        console::sub_item(&format!(
            "OK   {} ({}ms){}",
            result.candidate.name, result.elapsed_ms, fallback
        ));
    }

    for result in report.failed.iter().take(failed_preview) {
        let reason = result.error_kind.map(|k| k.label()).unwrap_or_default();
        console::sub_item(&format!("FAIL {}: {}", result.candidate.name, reason));
    }
    if report.failed.len() > failed_preview {
        console::sub_item(&format!(
            "... and {} more failures",
            report.failed.len() - failed_preview
        ));
    }

    for (title, key) in [
        ("By country", BreakdownKey::Country),
        ("By genre", BreakdownKey::Genre),
    ] {
        let counts = breakdown(&report.working, key, BREAKDOWN_LIMIT);
        let items: Vec<(&str, String)> = counts
            .iter()
            .map(|(name, count)| (name.as_str(), count.to_string()))
            .collect();
        console::summary(title, &items);
    }
}
