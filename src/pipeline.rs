//! Pipeline orchestration
//!
//! This module provides the public API for ShiftFlux.
//! It runs the full pipeline from validated shift records to tasks,
//! activities and engineered standards.

use uuid::Uuid;

use crate::activity::ActivityAggregator;
use crate::cards::{CardRegistry, FlowCardTable};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::gaps::GapInjector;
use crate::normalizer::RecordNormalizer;
use crate::smoother::TemporalSmoother;
use crate::standards::StandardsCalculator;
use crate::tracker::StateTracker;
use crate::types::{EngineOutput, ShiftRecord};

/// Run the full pipeline over one batch of records.
///
/// Pipeline stages:
/// 1. RecordNormalizer - Split batch durations across simultaneous lines
/// 2. TemporalSmoother - Average fragmented scans
/// 3. GapInjector - Fill idle and break stretches
/// 4. StateTracker - First-occurrence flags and engineered standards
/// 5. ActivityAggregator - Contiguous same-job blocks
///
/// Never fails: configuration misses are reported in `warnings`.
pub fn process_records(
    records: &[ShiftRecord],
    config: &EngineConfig,
    registry: &CardRegistry,
) -> EngineOutput {
    let run_id = Uuid::new_v4();
    let span = tracing::debug_span!("process_records", %run_id, records = records.len());
    let _guard = span.enter();

    let table = FlowCardTable::build(registry);

    // Stage 1: Normalize batches
    let tasks = RecordNormalizer::normalize(records, config);

    // Stage 2: Smooth fragmented scans
    let tasks = TemporalSmoother::smooth(tasks, config.smoothing_tolerance_sec);

    // Stage 3: Inject idle and break tasks
    let mut tasks = GapInjector::inject(tasks, config);

    // Stage 4: Flags and standards in one forward pass
    let mut calculator = StandardsCalculator::new(&table, config, &tasks);
    StateTracker::run(&mut tasks, &mut calculator);
    let warnings = calculator.into_warnings();

    // Stage 5: Aggregate activities
    let activities = ActivityAggregator::aggregate(&tasks);

    tracing::debug!(
        tasks = tasks.len(),
        activities = activities.len(),
        warnings = warnings.len(),
        "pipeline complete"
    );

    EngineOutput {
        run_id,
        tasks,
        activities,
        warnings,
    }
}

/// Parse a JSON array of shift records
pub fn parse_records(json: &str) -> Result<Vec<ShiftRecord>, EngineError> {
    serde_json::from_str(json)
        .map_err(|e| EngineError::ParseError(format!("Failed to parse shift records: {}", e)))
}

/// Run the pipeline over JSON inputs and return the output as JSON.
///
/// # Arguments
/// * `records_json` - JSON array of validated shift records
/// * `cards_json` - Card registry (array of cards or object keyed by id)
/// * `config_json` - Optional engine configuration; defaults when `None`
///
/// # Example
/// ```ignore
/// let output = process_json(records, cards, None)?;
/// ```
pub fn process_json(
    records_json: &str,
    cards_json: &str,
    config_json: Option<&str>,
) -> Result<String, EngineError> {
    let records = parse_records(records_json)?;
    let registry = CardRegistry::from_json(cards_json)?;
    let config = match config_json {
        Some(json) => EngineConfig::from_json(json)?,
        None => EngineConfig::default(),
    };

    let output = process_records(&records, &config, &registry);
    Ok(serde_json::to_string(&output)?)
}

/// Stateful processor that caches the last validated input.
///
/// Use this when the same records are rerun against edited cards or tunables.
#[derive(Debug, Default)]
pub struct ShiftProcessor {
    config: EngineConfig,
    registry: CardRegistry,
    last_input: Option<Vec<ShiftRecord>>,
}

impl ShiftProcessor {
    /// Create a processor with default tunables
    pub fn new(registry: CardRegistry) -> Self {
        Self {
            config: EngineConfig::default(),
            registry,
            last_input: None,
        }
    }

    /// Create a processor with explicit tunables
    pub fn with_config(config: EngineConfig, registry: CardRegistry) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            registry,
            last_input: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &CardRegistry {
        &self.registry
    }

    pub fn has_cached_input(&self) -> bool {
        self.last_input.is_some()
    }

    /// Process records and cache them for later reprocessing
    pub fn process(&mut self, records: Vec<ShiftRecord>) -> EngineOutput {
        let output = process_records(&records, &self.config, &self.registry);
        self.last_input = Some(records);
        output
    }

    /// Process a JSON array of records, returning JSON output
    pub fn process_json(&mut self, records_json: &str) -> Result<String, EngineError> {
        let records = parse_records(records_json)?;
        let output = self.process(records);
        Ok(serde_json::to_string(&output)?)
    }

    /// Rerun the cached input, optionally swapping configuration and cards first.
    ///
    /// The replacement config is validated before anything changes.
    pub fn reprocess(
        &mut self,
        config: Option<EngineConfig>,
        registry: Option<CardRegistry>,
    ) -> Result<EngineOutput, EngineError> {
        let records = self.last_input.as_ref().ok_or(EngineError::NothingToReprocess)?;

        if let Some(config) = config {
            config.validate()?;
            self.config = config;
        }
        if let Some(registry) = registry {
            self.registry = registry;
        }

        tracing::debug!(records = records.len(), "reprocessing cached input");
        Ok(process_records(records, &self.config, &self.registry))
    }
}
