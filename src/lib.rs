//! Cycle prediction and phase-correlation engine.
//!
//! The pure core (`dates`, `prediction`, `phase`, `correlation`) turns a list
//! of logged periods into statistics, predictions and phase-tagged insights.
//! `Tracker` wires it to a `Store` and a `Clock` for the app.

pub mod clock;
pub mod config;
pub mod correlation;
pub mod dates;
pub mod models;
pub mod phase;
pub mod prediction;
pub mod storage;
pub mod tracker;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use correlation::{compute_correlation_insights, CorrelationInsights, PhaseInsight};
pub use models::*;
pub use phase::classify_phase;
pub use prediction::{compute_cycle_stats, compute_fertile_window, cycle_history, cycle_summary};
pub use storage::{JsonFileStore, MemoryStore, Store};
pub use tracker::{Tracker, TrackerError};
