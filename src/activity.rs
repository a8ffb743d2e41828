//! Activity aggregation
//!
//! Folds each user's gap-filled task stream into contiguous blocks. A block
//! ends whenever the user, the JobCode or the task kind changes, so synthetic
//! idle and break tasks always form their own activities.

use std::collections::HashSet;

use crate::types::{is_placeholder_order, seconds_between, ActivityObject, TaskKind, TaskObject};

/// Aggregator for building activities from tasks
pub struct ActivityAggregator;

impl ActivityAggregator {
    /// Aggregate tasks (already in user/start order) into activities
    pub fn aggregate(tasks: &[TaskObject]) -> Vec<ActivityObject> {
        let mut activities = Vec::new();
        let mut block: Option<ActivityBlock> = None;

        for task in tasks {
            match block.as_mut() {
                Some(current) if current.accepts(task) => current.push(task),
                _ => {
                    if let Some(done) = block.take() {
                        activities.push(done.finish());
                    }
                    block = Some(ActivityBlock::start(task));
                }
            }
        }
        if let Some(done) = block {
            activities.push(done.finish());
        }

        tracing::debug!(tasks = tasks.len(), activities = activities.len(), "aggregated activities");
        activities
    }
}

/// Running totals for the block being built
struct ActivityBlock {
    activity: ActivityObject,
    user_key: String,
    job_key: String,
    orders: HashSet<String>,
}

impl ActivityBlock {
    fn start(task: &TaskObject) -> Self {
        let record = &task.record;
        let mut block = Self {
            activity: ActivityObject {
                user: record.user.clone(),
                client: record.client.clone(),
                warehouse: record.warehouse.clone(),
                job_code: record.job_code.clone(),
                job_type: record.job_type.clone(),
                kind: task.kind,
                start: record.start,
                finish: record.finish,
                duration_sec: 0.0,
                nof_tasks: 0,
                nof_units: 0.0,
                nof_orders: 0,
                productive_duration_sec: 0.0,
                unproductive_duration_sec: 0.0,
                task_direct_time_sec: 0.0,
                task_travel_time_sec: 0.0,
                standard_sec: 0.0,
            },
            user_key: record.user.trim().to_string(),
            job_key: record.job_code.trim().to_string(),
            orders: HashSet::new(),
        };
        block.push(task);
        block
    }

    fn accepts(&self, task: &TaskObject) -> bool {
        self.user_key == task.record.user.trim()
            && self.job_key == task.record.job_code.trim()
            && self.activity.kind == task.kind
    }

    fn push(&mut self, task: &TaskObject) {
        let a = &mut self.activity;
        let record = &task.record;

        a.start = a.start.min(record.start);
        a.finish = a.finish.max(record.finish);
        a.nof_tasks += 1;
        if task.kind == TaskKind::Work {
            a.nof_units += record.units();
        }
        a.productive_duration_sec += task.productive_duration_sec;
        a.unproductive_duration_sec += task.unproductive_duration_sec;
        a.task_direct_time_sec += task.task_direct_time_sec;
        a.task_travel_time_sec += task.task_travel_time_sec;
        a.standard_sec += task.productive_duration_standard_sec;

        if !is_placeholder_order(&record.order_code) {
            self.orders.insert(record.order_code.trim().to_string());
        }
    }

    fn finish(mut self) -> ActivityObject {
        self.activity.nof_orders = self.orders.len();
        self.activity.duration_sec = seconds_between(self.activity.start, self.activity.finish).max(0.0);
        self.activity
    }
}
