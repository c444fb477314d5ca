//! Service layer for the validation engine.
//!
//! This module contains:
//! - Stream probing (`HttpProbe`, behind the `Probe` trait)
//! - Fallback resolution (`FallbackResolver`)
//! - Payload sniffing (`sniff`)
//! - Candidate discovery (`RadioBrowserClient`)

mod fallback;
mod probe;
mod radio_browser;
pub mod sniff;

pub use fallback::FallbackResolver;
pub use probe::{HttpProbe, Probe, ProbeState};
pub use radio_browser::RadioBrowserClient;
