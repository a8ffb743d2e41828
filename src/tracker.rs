//! Per-job first-occurrence tracking
//!
//! One forward pass over the ordered task list. A `JobState` accumulator lives
//! for exactly one (user, job) run and answers "is this the first X in the
//! current job?" for each task; the standards calculator consumes the answers
//! in the same pass.

use std::collections::HashSet;

use crate::standards::StandardsCalculator;
use crate::types::{is_placeholder_order, OccurrenceFlags, TaskObject, TaskRole};

/// Visited sets for the current (user, job) run
#[derive(Debug, Default)]
struct JobState {
    user: String,
    job_code: String,
    visited_locs: HashSet<String>,
    visited_loc_skus: HashSet<String>,
    visited_orders: HashSet<String>,
    /// Packing order overhead keys off the order alone, independent of picking
    visited_packing_orders: HashSet<String>,
    seen_roles: HashSet<TaskRole>,
    last_task_type: Option<String>,
}

impl JobState {
    fn new(user: String, job_code: String) -> Self {
        Self {
            user,
            job_code,
            ..Default::default()
        }
    }

    fn matches(&self, user: &str, job_code: &str) -> bool {
        self.user == user && self.job_code == job_code
    }
}

/// First-occurrence tracker for a single forward pass
#[derive(Debug, Default)]
pub struct OccurrenceTracker {
    current: Option<JobState>,
}

impl OccurrenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `task` and return its first-occurrence flags.
    ///
    /// Synthetic gap tasks get all-false flags and leave the state untouched.
    pub fn observe(&mut self, task: &TaskObject) -> OccurrenceFlags {
        if task.is_synthetic() {
            return OccurrenceFlags::default();
        }

        let record = &task.record;
        let user = record.user.trim().to_string();
        let job_code = record.job_code.trim().to_string();

        let (state, is_first_task_in_job) = match self.current.take() {
            Some(state) if state.matches(&user, &job_code) => (state, false),
            // New job (or new user): every per-job set starts empty
            _ => (JobState::new(user, job_code), true),
        };
        let state = self.current.insert(state);

        let location = record.location.trim().to_string();
        let sku = record.sku.trim();
        let task_type = record.task_type.trim().to_lowercase();
        let order = record.order_code.trim();

        let is_first_role_task_in_job = task.role.map_or(false, |r| state.seen_roles.insert(r));
        let is_first_in_task_type_run = state.last_task_type.as_deref() != Some(task_type.as_str());
        state.last_task_type = Some(task_type);

        let is_new_sku = state.visited_loc_skus.insert(format!("{}|{}", location, sku));
        let is_new_visit = state.visited_locs.insert(location);

        let (is_first_task_in_order, is_first_packing_task_in_order) = if is_placeholder_order(order) {
            (false, false)
        } else {
            let first_in_order = state.visited_orders.insert(order.to_string());
            let first_packing = task.role == Some(TaskRole::Packing)
                && state.visited_packing_orders.insert(order.to_string());
            (first_in_order, first_packing)
        };

        OccurrenceFlags {
            is_first_task_in_job,
            is_first_role_task_in_job,
            is_first_in_task_type_run,
            is_new_visit,
            is_new_sku,
            is_first_task_in_order,
            is_first_packing_task_in_order,
        }
    }
}

/// Single pass assigning flags and engineered standards
pub struct StateTracker;

impl StateTracker {
    /// Walk tasks in order, computing flags and standards for each.
    ///
    /// `tasks` must already be in (user, start) order with gaps injected.
    pub fn run(tasks: &mut [TaskObject], calculator: &mut StandardsCalculator<'_>) {
        let mut tracker = OccurrenceTracker::new();
        for task in tasks.iter_mut() {
            let flags = tracker.observe(task);
            let evaluation = calculator.evaluate(task, &flags);

            task.flags = flags;
            task.flow_class = evaluation.flow_class;
            task.job_overhead_source = evaluation.job_overhead_source;
            task.set_standards(evaluation.standards);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ShiftRecord, TaskKind};
    use chrono::{Duration, TimeZone, Utc};

    fn task(user: &str, job: &str, task_type: &str, location: &str, sku: &str, order: &str) -> TaskObject {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
        let record = ShiftRecord {
            user: user.to_string(),
            client: String::new(),
            warehouse: String::new(),
            wave_code: String::new(),
            job_code: job.to_string(),
            job_type: "MICP".to_string(),
            order_code: order.to_string(),
            task_type: task_type.to_string(),
            sku: sku.to_string(),
            quantity: 1.0,
            zone: String::new(),
            location: location.to_string(),
            start,
            finish: start + Duration::seconds(10),
        };
        TaskObject::from_record(record, 1, 0.3)
    }

    #[test]
    fn test_repeat_requests_are_not_first() {
        let mut tracker = OccurrenceTracker::new();
        let first = tracker.observe(&task("u1", "J1", "Pick", "A-01", "S1", "O1"));
        let again = tracker.observe(&task("u1", "J1", "Pick", "A-01", "S1", "O1"));

        assert!(first.is_first_task_in_job);
        assert!(first.is_new_visit && first.is_new_sku && first.is_first_task_in_order);
        assert!(!again.is_first_task_in_job);
        assert!(!again.is_new_visit);
        assert!(!again.is_new_sku);
        assert!(!again.is_first_task_in_order);
    }

    #[test]
    fn test_new_sku_at_visited_location() {
        let mut tracker = OccurrenceTracker::new();
        tracker.observe(&task("u1", "J1", "Pick", "A-01", "S1", "O1"));
        let flags = tracker.observe(&task("u1", "J1", "Pick", "A-01", "S2", "O1"));
        assert!(!flags.is_new_visit);
        assert!(flags.is_new_sku);
    }

    #[test]
    fn test_job_change_resets_sets() {
        let mut tracker = OccurrenceTracker::new();
        tracker.observe(&task("u1", "J1", "Pick", "A-01", "S1", "O1"));
        let flags = tracker.observe(&task("u1", "J2", "Pick", "A-01", "S1", "O1"));

        assert!(flags.is_first_task_in_job);
        assert!(flags.is_new_visit);
        assert!(flags.is_new_sku);
        assert!(flags.is_first_task_in_order);
    }

    #[test]
    fn test_user_change_resets_sets() {
        let mut tracker = OccurrenceTracker::new();
        tracker.observe(&task("u1", "J1", "Pick", "A-01", "S1", "O1"));
        let flags = tracker.observe(&task("u2", "J1", "Pick", "A-01", "S1", "O1"));
        assert!(flags.is_first_task_in_job);
        assert!(flags.is_new_visit);
    }

    #[test]
    fn test_packing_orders_tracked_separately() {
        let mut tracker = OccurrenceTracker::new();
        let pick = tracker.observe(&task("u1", "J1", "Pick", "A-01", "S1", "O1"));
        let pack = tracker.observe(&task("u1", "J1", "Pack", "P-01", "S1", "O1"));
        let pack_again = tracker.observe(&task("u1", "J1", "Pack", "P-01", "S1", "O1"));

        assert!(pick.is_first_task_in_order);
        assert!(!pick.is_first_packing_task_in_order);
        assert!(!pack.is_first_task_in_order);
        assert!(pack.is_first_packing_task_in_order);
        assert!(pack.is_first_role_task_in_job);
        assert!(!pack_again.is_first_packing_task_in_order);
    }

    #[test]
    fn test_placeholder_orders_never_first() {
        let mut tracker = OccurrenceTracker::new();
        let flags = tracker.observe(&task("u1", "J1", "Pack", "P-01", "S1", ""));
        assert!(!flags.is_first_task_in_order);
        assert!(!flags.is_first_packing_task_in_order);
    }

    #[test]
    fn test_task_type_runs() {
        let mut tracker = OccurrenceTracker::new();
        let a = tracker.observe(&task("u1", "J1", "Pick", "A-01", "S1", "O1"));
        let b = tracker.observe(&task("u1", "J1", "pick", "A-02", "S1", "O1"));
        let c = tracker.observe(&task("u1", "J1", "Pack", "P-01", "S1", "O1"));
        let d = tracker.observe(&task("u1", "J1", "Pick", "A-03", "S1", "O1"));

        assert!(a.is_first_in_task_type_run);
        assert!(!b.is_first_in_task_type_run);
        assert!(c.is_first_in_task_type_run);
        assert!(d.is_first_in_task_type_run);
        assert!(!d.is_first_role_task_in_job);
    }

    #[test]
    fn test_synthetic_tasks_do_not_disturb_state() {
        let mut tracker = OccurrenceTracker::new();
        let first = task("u1", "J1", "Pick", "A-01", "S1", "O1");
        tracker.observe(&first);

        let gap = TaskObject::gap(&first.record, TaskKind::Break, first.record.finish, first.record.finish);
        assert_eq!(tracker.observe(&gap), OccurrenceFlags::default());

        let flags = tracker.observe(&task("u1", "J1", "Pick", "A-01", "S1", "O1"));
        assert!(!flags.is_first_task_in_job);
        assert!(!flags.is_new_visit);
    }
}
