//! Pipeline stages and entry points.
//!
//! - `load_candidates`: Gather stations from the catalog and directory
//! - `dedupe`: Collapse candidates pointing at the same endpoint
//! - `BatchScheduler`: Resolve candidates in bounded windows
//! - `aggregate` / `build_frequency_map`: Report and tuner map
//! - `run_validation`: All of the above, persisted to storage

pub mod aggregate;
pub mod breakdown;
pub mod dedupe;
pub mod run;
pub mod schedule;
pub mod sources;

pub use aggregate::{aggregate, assign_frequencies, build_frequency_map};
pub use breakdown::{BreakdownKey, breakdown};
pub use dedupe::dedupe;
pub use run::{rebuild_station_map, run_validation};
pub use schedule::{BatchProgress, BatchScheduler, windows};
pub use sources::load_candidates;
