//! Core types for the ShiftFlux pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw shift records, normalized tasks, activities, and run output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cards::{FlowClass, JobOverheadSource};

/// JobCode assigned to synthetic break tasks
pub const UNASSIGNED_JOB: &str = "Unassigned";

/// TaskType assigned to synthetic break tasks
pub const BREAK_TASK_TYPE: &str = "Implicit Break/Delay";

/// JobType assigned to synthetic break tasks
pub const BREAK_JOB_TYPE: &str = "Break";

/// TaskType assigned to synthetic in-job idle tasks
pub const NO_ACTIVITY_TASK_TYPE: &str = "No Activity";

/// TaskType keywords that mark a task as productive work
const PRODUCTIVE_KEYWORDS: [&str; 6] = ["pick", "sort", "pack", "put", "stow", "load"];

/// Order codes that carry no order identity
const PLACEHOLDER_ORDERS: [&str; 5] = ["", "unknown", "n/a", "none", "-"];

/// A single raw work record as delivered by the ingestion layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShiftRecord {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub warehouse: String,
    #[serde(default)]
    pub wave_code: String,
    #[serde(default)]
    pub job_code: String,
    /// Flow-class acronym, possibly remapped through configuration
    #[serde(default)]
    pub job_type: String,
    #[serde(default)]
    pub order_code: String,
    #[serde(default)]
    pub task_type: String,
    #[serde(rename = "SKU", default)]
    pub sku: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub location: String,
    pub start: DateTime<Utc>,
    /// Not guaranteed to be after `start`
    pub finish: DateTime<Utc>,
}

impl ShiftRecord {
    /// Observed duration in seconds, clamped to zero
    pub fn raw_duration_sec(&self) -> f64 {
        seconds_between(self.start, self.finish).max(0.0)
    }

    /// Whether the task type names productive work
    pub fn is_productive(&self) -> bool {
        let task_type = self.task_type.to_lowercase();
        PRODUCTIVE_KEYWORDS.iter().any(|k| task_type.contains(k))
    }

    /// Quantity with negative and non-finite values treated as zero
    pub fn units(&self) -> f64 {
        if self.quantity.is_finite() {
            self.quantity.max(0.0)
        } else {
            0.0
        }
    }
}

/// Seconds from `from` to `to` (negative if `to` is earlier)
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

/// Whether an order code is a placeholder rather than a real order
pub fn is_placeholder_order(order_code: &str) -> bool {
    let code = order_code.trim().to_lowercase();
    PLACEHOLDER_ORDERS.contains(&code.as_str())
}

/// Work phase a task belongs to, derived from its TaskType
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskRole {
    Picking,
    Sorting,
    Packing,
}

impl TaskRole {
    pub const ALL: [TaskRole; 3] = [TaskRole::Picking, TaskRole::Sorting, TaskRole::Packing];

    /// Resolve the role from a TaskType keyword.
    ///
    /// "pack" wins over "sort" which wins over "pick", so a
    /// "Pick & Pack" row is costed as packing.
    pub fn from_task_type(task_type: &str) -> Option<TaskRole> {
        let task_type = task_type.to_lowercase();
        if task_type.contains("pack") {
            Some(TaskRole::Packing)
        } else if task_type.contains("sort") {
            Some(TaskRole::Sorting)
        } else if task_type.contains("pick") {
            Some(TaskRole::Picking)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskRole::Picking => "picking",
            TaskRole::Sorting => "sorting",
            TaskRole::Packing => "packing",
        }
    }
}

/// Whether a task is observed work or a synthesized gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    Work,
    /// Short idle stretch inside a single job
    NoActivity,
    /// Idle stretch between jobs, or a long pause inside one
    Break,
}

impl TaskKind {
    pub fn is_synthetic(&self) -> bool {
        !matches!(self, TaskKind::Work)
    }
}

/// First-occurrence flags computed by the state tracker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OccurrenceFlags {
    /// JobCode (or user) changed since the previous task
    pub is_first_task_in_job: bool,
    /// First task of this task's role within the current job
    pub is_first_role_task_in_job: bool,
    /// First task of a run of identical TaskTypes within the job
    pub is_first_in_task_type_run: bool,
    pub is_new_visit: bool,
    pub is_new_sku: bool,
    pub is_first_task_in_order: bool,
    pub is_first_packing_task_in_order: bool,
}

/// Engineered-standard output buckets, in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardSeconds {
    #[serde(rename = "StandardPickingInitSec")]
    pub picking_init: f64,
    #[serde(rename = "StandardPickingProcessSec")]
    pub picking_process: f64,
    #[serde(rename = "StandardPickingTravelSec")]
    pub picking_travel: f64,
    #[serde(rename = "StandardSortingInitSec")]
    pub sorting_init: f64,
    #[serde(rename = "StandardSortingProcessSec")]
    pub sorting_process: f64,
    #[serde(rename = "StandardPackingInitSec")]
    pub packing_init: f64,
    #[serde(rename = "StandardPackingProcessSec")]
    pub packing_process: f64,
}

impl StandardSeconds {
    pub fn total(&self) -> f64 {
        self.picking_init
            + self.picking_process
            + self.picking_travel
            + self.sorting_init
            + self.sorting_process
            + self.packing_init
            + self.packing_process
    }

    /// Add init/process seconds to the buckets of `role`.
    ///
    /// Travel only has a picking bucket; for other roles it folds into process.
    pub fn add(&mut self, role: TaskRole, init: f64, process: f64, travel: f64) {
        match role {
            TaskRole::Picking => {
                self.picking_init += init;
                self.picking_process += process;
                self.picking_travel += travel;
            }
            TaskRole::Sorting => {
                self.sorting_init += init;
                self.sorting_process += process + travel;
            }
            TaskRole::Packing => {
                self.packing_init += init;
                self.packing_process += process + travel;
            }
        }
    }
}

/// A normalized task derived from one or more shift records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskObject {
    #[serde(flatten)]
    pub record: ShiftRecord,
    pub kind: TaskKind,
    pub role: Option<TaskRole>,
    pub flow_class: Option<FlowClass>,
    pub productive_duration_sec: f64,
    pub unproductive_duration_sec: f64,
    pub task_direct_time_sec: f64,
    pub task_travel_time_sec: f64,
    pub is_batch_normalized: bool,
    pub batch_size: usize,
    /// Raw duration before batch apportionment
    pub original_duration_sec: f64,
    /// Number of tasks in the smoothing cluster this task belonged to
    pub cluster_size: usize,
    #[serde(flatten)]
    pub standards: StandardSeconds,
    pub productive_duration_standard_sec: f64,
    pub job_overhead_source: Option<JobOverheadSource>,
    pub flags: OccurrenceFlags,
}

impl TaskObject {
    /// Build a work task from a record whose duration is shared across `batch_size` lines
    pub fn from_record(record: ShiftRecord, batch_size: usize, picking_direct_ratio: f64) -> Self {
        let batch_size = batch_size.max(1);
        let original_duration_sec = record.raw_duration_sec();
        let apportioned = original_duration_sec / batch_size as f64;
        let productive = record.is_productive();
        let role = TaskRole::from_task_type(&record.task_type);

        let mut task = Self {
            record,
            kind: TaskKind::Work,
            role,
            flow_class: None,
            productive_duration_sec: if productive { apportioned } else { 0.0 },
            unproductive_duration_sec: if productive { 0.0 } else { apportioned },
            task_direct_time_sec: 0.0,
            task_travel_time_sec: 0.0,
            is_batch_normalized: batch_size > 1,
            batch_size,
            original_duration_sec,
            cluster_size: 1,
            standards: StandardSeconds::default(),
            productive_duration_standard_sec: 0.0,
            job_overhead_source: None,
            flags: OccurrenceFlags::default(),
        };
        task.split_direct_travel(picking_direct_ratio);
        task
    }

    /// Build a synthetic gap task spanning `[start, finish)`
    pub fn gap(
        template: &ShiftRecord,
        kind: TaskKind,
        start: DateTime<Utc>,
        finish: DateTime<Utc>,
    ) -> Self {
        let (job_code, job_type, task_type) = match kind {
            TaskKind::NoActivity => (
                template.job_code.clone(),
                template.job_type.clone(),
                NO_ACTIVITY_TASK_TYPE.to_string(),
            ),
            _ => (
                UNASSIGNED_JOB.to_string(),
                BREAK_JOB_TYPE.to_string(),
                BREAK_TASK_TYPE.to_string(),
            ),
        };
        let record = ShiftRecord {
            user: template.user.clone(),
            client: template.client.clone(),
            warehouse: template.warehouse.clone(),
            wave_code: String::new(),
            job_code,
            job_type,
            order_code: String::new(),
            task_type,
            sku: String::new(),
            quantity: 0.0,
            zone: String::new(),
            location: String::new(),
            start,
            finish,
        };
        let duration = seconds_between(start, finish).max(0.0);

        Self {
            record,
            kind,
            role: None,
            flow_class: None,
            productive_duration_sec: 0.0,
            unproductive_duration_sec: duration,
            task_direct_time_sec: 0.0,
            task_travel_time_sec: 0.0,
            is_batch_normalized: false,
            batch_size: 1,
            original_duration_sec: duration,
            cluster_size: 1,
            standards: StandardSeconds::default(),
            productive_duration_standard_sec: 0.0,
            job_overhead_source: None,
            flags: OccurrenceFlags::default(),
        }
    }

    /// Derive the legacy direct/travel split from productive seconds
    pub fn split_direct_travel(&mut self, picking_direct_ratio: f64) {
        let ratio = match self.role {
            Some(TaskRole::Picking) => picking_direct_ratio.clamp(0.0, 1.0),
            _ => 1.0,
        };
        self.task_direct_time_sec = self.productive_duration_sec * ratio;
        self.task_travel_time_sec = self.productive_duration_sec * (1.0 - ratio);
    }

    pub fn is_synthetic(&self) -> bool {
        self.kind.is_synthetic()
    }

    /// Productive plus unproductive seconds
    pub fn duration_sec(&self) -> f64 {
        self.productive_duration_sec + self.unproductive_duration_sec
    }

    pub fn set_standards(&mut self, standards: StandardSeconds) {
        self.productive_duration_standard_sec = standards.total();
        self.standards = standards;
    }
}

/// One contiguous block of same-job work by a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActivityObject {
    pub user: String,
    pub client: String,
    pub warehouse: String,
    pub job_code: String,
    pub job_type: String,
    pub kind: TaskKind,
    pub start: DateTime<Utc>,
    pub finish: DateTime<Utc>,
    pub duration_sec: f64,
    pub nof_tasks: usize,
    pub nof_units: f64,
    pub nof_orders: usize,
    pub productive_duration_sec: f64,
    pub unproductive_duration_sec: f64,
    pub task_direct_time_sec: f64,
    pub task_travel_time_sec: f64,
    /// Sum of member engineered standards
    pub standard_sec: f64,
}

/// Diagnosable configuration misses raised during a run
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum EngineWarning {
    /// JobType resolved to an acronym that is not a known flow class
    UnknownFlowClass { job_type: String, acronym: String },
    /// Neither the flow-class card nor the generic card exists for a role
    CardNotFound { card_id: String, role: TaskRole },
    /// Flow-class card missing; the generic duration card was used instead
    GenericCardFallback {
        flow_class: FlowClass,
        role: TaskRole,
        card_id: String,
    },
    /// No job overhead was found on the card or the shared job_init card
    JobOverheadMissing { card_id: String, role: TaskRole },
}

/// Output of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineOutput {
    /// Provenance identifier; not part of any computed value
    pub run_id: Uuid,
    pub tasks: Vec<TaskObject>,
    pub activities: Vec<ActivityObject>,
    pub warnings: Vec<EngineWarning>,
}
