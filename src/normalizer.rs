//! Record normalization
//!
//! Converts raw shift records into tasks:
//! - Simultaneous-start batches (same user, start, finish and location) share one
//!   observed duration evenly
//! - Productive vs. unproductive time from TaskType keywords
//! - Legacy direct/travel split

use crate::config::EngineConfig;
use crate::types::{ShiftRecord, TaskObject};

/// Identity of a simultaneous-scan batch
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct BatchKey {
    user: String,
    start_ms: i64,
    finish_ms: i64,
    location: String,
}

impl BatchKey {
    fn of(record: &ShiftRecord) -> Self {
        Self {
            user: record.user.trim().to_string(),
            start_ms: record.start.timestamp_millis(),
            finish_ms: record.finish.timestamp_millis(),
            location: record.location.trim().to_string(),
        }
    }
}

/// Normalizer for converting shift records to tasks
pub struct RecordNormalizer;

impl RecordNormalizer {
    /// Normalize records into tasks, ordered by batch key.
    ///
    /// Each member of a batch of size B receives `raw / B` seconds, so the
    /// batch sums back to the single observed duration.
    pub fn normalize(records: &[ShiftRecord], config: &EngineConfig) -> Vec<TaskObject> {
        let mut keyed: Vec<(BatchKey, &ShiftRecord)> =
            records.iter().map(|r| (BatchKey::of(r), r)).collect();
        // Stable: equal keys keep input order
        keyed.sort_by(|a, b| a.0.cmp(&b.0));

        let mut tasks = Vec::with_capacity(records.len());
        let mut i = 0;
        while i < keyed.len() {
            let mut j = i + 1;
            while j < keyed.len() && keyed[j].0 == keyed[i].0 {
                j += 1;
            }

            let batch_size = j - i;
            for (_, record) in &keyed[i..j] {
                tasks.push(TaskObject::from_record(
                    (*record).clone(),
                    batch_size,
                    config.picking_direct_ratio,
                ));
            }
            i = j;
        }

        let batched = tasks.iter().filter(|t| t.is_batch_normalized).count();
        tracing::debug!(records = records.len(), batched, "normalized shift records");

        tasks
    }
}
