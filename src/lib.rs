//! parkwatch - parking lot occupancy analysis
//!
//! Takes a parking-lot photo, counts vehicles with a pretrained object
//! detector, computes occupancy against a declared capacity, and records
//! every analysis in an append-only history with JSON and spreadsheet
//! exports.
//!
//! # Module Structure
//!
//! - `detect`: detector adapter (backend trait, ONNX and stub backends,
//!   annotation, process-wide model cache)
//! - `metrics`: occupancy arithmetic
//! - `history`: persistent append-only analysis log plus export projections
//! - `analyzer`: the upload -> detect -> metrics -> record pipeline
//! - `config`: file + env configuration
//!
//! # Model
//!
//! Single operator, one analysis at a time. The detection model is loaded
//! once per process and reused. History appends rewrite the whole file via
//! temp-then-rename and are not safe under concurrent writers.

pub mod analyzer;
pub mod config;
pub mod detect;
pub mod error;
pub mod history;
pub mod metrics;

pub use analyzer::{AnalysisOutcome, Analyzer};
pub use config::{DetectorSettings, ParkwatchConfig};
pub use detect::{
    decode_image, detect_vehicles, Detection, DetectionOutput, DetectorBackend, StubBackend,
};
#[cfg(feature = "backend-tract")]
pub use detect::{shared_backend, TractBackend};
pub use error::Error;
pub use history::{AnalysisRecord, HistoryStore, NewAnalysis, DISPLAY_COLUMNS};
pub use metrics::{compute, OccupancyMetrics};
