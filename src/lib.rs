//! ShiftFlux - Warehouse task normalization and engineered labor standards
//!
//! ShiftFlux turns validated warehouse shift records into normalized tasks,
//! contiguous activities and per-task engineered standards through a
//! deterministic pipeline: batch normalization → temporal smoothing → gap
//! injection → first-occurrence tracking and standards → activity aggregation.
//!
//! Configuration misses never fail a run; they are returned as
//! [`EngineWarning`] values alongside the output.

pub mod activity;
pub mod cards;
pub mod config;
pub mod error;
pub mod gaps;
pub mod normalizer;
pub mod pipeline;
pub mod smoother;
pub mod standards;
pub mod tracker;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use cards::{CalculationCard, CardRegistry, FlowClass};
pub use config::EngineConfig;
pub use error::EngineError;
pub use pipeline::{process_json, process_records, ShiftProcessor};
pub use types::{ActivityObject, EngineOutput, EngineWarning, ShiftRecord, TaskObject};

/// ShiftFlux version
pub const SHIFTFLUX_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "shiftflux";
