//! Engine configuration
//!
//! Tunables for smoothing, gap injection and the direct/travel split, plus the
//! JobType → flow-class remapping table. Loaded from snake_case JSON with every
//! field defaulted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::EngineError;

/// Default smoothing tolerance in seconds
pub const DEFAULT_SMOOTHING_TOLERANCE_SEC: f64 = 2.0;

/// Default break threshold in seconds (5 minutes)
pub const DEFAULT_BREAK_THRESHOLD_SEC: f64 = 300.0;

/// Gaps at or above this are off-shift and never filled (2 hours)
pub const DEFAULT_MAX_GAP_SEC: f64 = 7200.0;

/// Default share of picking time counted as direct work
pub const DEFAULT_PICKING_DIRECT_RATIO: f64 = 0.30;

/// Run configuration for the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub smoothing_tolerance_sec: f64,
    pub break_threshold_sec: f64,
    pub max_gap_sec: f64,
    /// Direct share of picking productive time; travel gets the remainder
    pub picking_direct_ratio: f64,
    /// JobType → flow-class acronym; unmapped JobTypes are used as-is
    pub job_type_map: HashMap<String, String>,
    /// Optional per-user cursor seed for leading-gap detection
    pub shift_starts: HashMap<String, DateTime<Utc>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            smoothing_tolerance_sec: DEFAULT_SMOOTHING_TOLERANCE_SEC,
            break_threshold_sec: DEFAULT_BREAK_THRESHOLD_SEC,
            max_gap_sec: DEFAULT_MAX_GAP_SEC,
            picking_direct_ratio: DEFAULT_PICKING_DIRECT_RATIO,
            job_type_map: HashMap::new(),
            shift_starts: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Resolve a JobType to its flow-class acronym
    pub fn flow_class_acronym<'a>(&'a self, job_type: &'a str) -> &'a str {
        let job_type = job_type.trim();
        self.job_type_map
            .get(job_type)
            .map(|s| s.trim())
            .unwrap_or(job_type)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        check_non_negative("smoothing_tolerance_sec", self.smoothing_tolerance_sec)?;
        check_non_negative("break_threshold_sec", self.break_threshold_sec)?;
        check_non_negative("max_gap_sec", self.max_gap_sec)?;

        if self.max_gap_sec <= self.break_threshold_sec {
            return Err(EngineError::InvalidConfig(format!(
                "max_gap_sec ({}) must exceed break_threshold_sec ({})",
                self.max_gap_sec, self.break_threshold_sec
            )));
        }

        if !(0.0..=1.0).contains(&self.picking_direct_ratio) {
            return Err(EngineError::InvalidConfig(format!(
                "picking_direct_ratio must be within 0..=1, got {}",
                self.picking_direct_ratio
            )));
        }

        Ok(())
    }

    /// Load and validate configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )))
    }
}
