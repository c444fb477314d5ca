// src/pipeline/aggregate.rs

//! Result aggregation and frequency assignment.

use chrono::Utc;

use crate::models::{Candidate, Report, StationEntry, StationMap, ValidationResult};

/// Partition results into working and failed and compute the success ratio.
///
/// Input order is preserved within each partition.
pub fn aggregate(results: Vec<ValidationResult>, duplicates_dropped: usize) -> Report {
    let total_tested = results.len();
    let (working, failed): (Vec<_>, Vec<_>) = results.into_iter().partition(|r| r.working);

    let success_ratio = if total_tested == 0 {
        0.0
    } else {
        working.len() as f64 / total_tested as f64
    };

    Report {
        generated_at: Utc::now(),
        total_tested,
        duplicates_dropped,
        working,
        failed,
        success_ratio,
    }
}

/// Assign the i-th working result to the i-th frequency on the axis.
///
/// Stops at whichever runs out first. Failed results are skipped.
pub fn build_frequency_map(results: &[ValidationResult], axis: &[u32]) -> StationMap {
    assign_frequencies(
        results.iter().filter(|r| r.working).map(|r| &r.candidate),
        axis,
    )
}

/// Place stations on the axis in order, one per frequency.
///
/// Stations beyond the end of the axis are left out and counted in a warning.
pub fn assign_frequencies<'a>(
    stations: impl IntoIterator<Item = &'a Candidate>,
    axis: &[u32],
) -> StationMap {
    let (map, unplaced) = place(stations, axis);
    if unplaced > 0 {
        log::warn!("{unplaced} working stations do not fit on the frequency axis");
    }
    map
}

/// The map plus the number of stations left over once the axis ran out.
fn place<'a>(
    stations: impl IntoIterator<Item = &'a Candidate>,
    axis: &[u32],
) -> (StationMap, usize) {
    let mut stations = stations.into_iter();
    let map = axis
        .iter()
        .zip(stations.by_ref())
        .map(|(&frequency, station)| (frequency, StationEntry::from(station)))
        .collect();
    (map, stations.count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ErrorKind, FrequencyAxis};

    fn result(name: &str, working: bool) -> ValidationResult {
        ValidationResult {
            candidate: Candidate::new(name, format!("https://{name}.example/stream")),
            working,
            error_kind: (!working).then_some(ErrorKind::Timeout),
            http_status: working.then_some(200),
            elapsed_ms: 40,
            used_fallback: false,
            format: None,
        }
    }

    #[test]
    fn test_aggregate_partitions_and_counts() {
        let results = vec![
            result("a", true),
            result("b", false),
            result("c", true),
            result("d", false),
            result("e", false),
        ];

        let report = aggregate(results, 2);

        assert_eq!(report.total_tested, 5);
        assert_eq!(report.working.len() + report.failed.len(), report.total_tested);
        assert_eq!(report.working[0].candidate.name, "a");
        assert_eq!(report.working[1].candidate.name, "c");
        assert_eq!(report.failed[0].candidate.name, "b");
        assert!((report.success_ratio - 0.4).abs() < f64::EPSILON);
        assert_eq!(report.duplicates_dropped, 2);
        assert_eq!(report.success_rate(), "40.0%");
    }

    #[test]
    fn test_aggregate_empty_run() {
        let report = aggregate(Vec::new(), 0);
        assert_eq!(report.total_tested, 0);
        assert_eq!(report.success_ratio, 0.0);
        assert_eq!(report.success_rate(), "0.0%");
    }

    #[test]
    fn test_frequency_map_truncates_to_axis() {
        let results: Vec<_> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|n| result(n, true))
            .collect();

        let map = build_frequency_map(&results, &[530, 540, 550]);

        assert_eq!(map.len(), 3);
        assert_eq!(map[&530].name, "a");
        assert_eq!(map[&540].name, "b");
        assert_eq!(map[&550].name, "c");

        // surplus stations stay in the report
        let report = aggregate(results, 0);
        assert_eq!(report.working.len(), 5);
    }

    #[test]
    fn test_placement_counts_stations_beyond_axis() {
        let results: Vec<_> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|n| result(n, true))
            .collect();

        let (map, unplaced) = place(results.iter().map(|r| &r.candidate), &[530, 540, 550]);
        assert_eq!(map.len(), 3);
        assert_eq!(unplaced, 2);

        let (map, unplaced) = place(results.iter().map(|r| &r.candidate), &[]);
        assert!(map.is_empty());
        assert_eq!(unplaced, 5);

        let (_, unplaced) = place(results[..2].iter().map(|r| &r.candidate), &[530, 540, 550]);
        assert_eq!(unplaced, 0);
    }

    #[test]
    fn test_frequency_map_skips_failed() {
        let results = vec![result("a", false), result("b", true), result("c", true)];
        let map = build_frequency_map(&results, &FrequencyAxis::default().values());

        assert_eq!(map.len(), 2);
        assert_eq!(map[&530].name, "b");
        assert_eq!(map[&540].name, "c");
        assert_eq!(map[&530].genre, "Variety");
        assert_eq!(map[&530].country, "International");
    }
}
