//! Gap injection
//!
//! Walks each user's smoothed timeline with a cursor at the latest finish seen
//! so far and fills uncovered stretches with synthetic tasks:
//! - same job on both sides and at most the break threshold → No Activity,
//!   keeping the job's JobCode
//! - anything else (job change, leading gap, long in-job pause) → Break under
//!   the "Unassigned" job
//!
//! Gaps of `max_gap_sec` or more are treated as off-shift and left empty.

use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::types::{seconds_between, TaskKind, TaskObject};

/// Injector for synthetic idle and break tasks
pub struct GapInjector;

impl GapInjector {
    /// Fill gaps in tasks already sorted by (user, start).
    ///
    /// The cursor starts at the user's first task unless `config.shift_starts`
    /// seeds it, so there is no leading gap without an anchor.
    pub fn inject(tasks: Vec<TaskObject>, config: &EngineConfig) -> Vec<TaskObject> {
        let mut output = Vec::with_capacity(tasks.len());
        let mut timeline: Option<UserTimeline> = None;
        let mut injected = 0;

        for task in tasks {
            let user = task.record.user.trim().to_string();
            let same_user = timeline.as_ref().map_or(false, |t| t.user == user);
            if !same_user {
                let anchor = config.shift_starts.get(&user).copied();
                timeline = Some(UserTimeline::new(user, anchor.unwrap_or(task.record.start)));
            }

            if let Some(timeline) = timeline.as_mut() {
                if let Some(gap) = timeline.gap_before(&task, config) {
                    output.push(gap);
                    injected += 1;
                }
                timeline.advance(&task);
            }
            output.push(task);
        }

        tracing::debug!(tasks = output.len(), injected, "injected gap tasks");
        output
    }
}

/// Per-user cursor state for one forward pass
struct UserTimeline {
    user: String,
    cursor: DateTime<Utc>,
    /// JobCode of the last real task, `None` before the first job
    last_job: Option<String>,
}

impl UserTimeline {
    fn new(user: String, cursor: DateTime<Utc>) -> Self {
        Self {
            user,
            cursor,
            last_job: None,
        }
    }

    fn gap_before(&self, task: &TaskObject, config: &EngineConfig) -> Option<TaskObject> {
        let gap_sec = seconds_between(self.cursor, task.record.start);
        if gap_sec <= 0.0 || gap_sec >= config.max_gap_sec {
            return None;
        }

        let job = task.record.job_code.trim();
        let kind = match self.last_job.as_deref() {
            Some(last) if last == job && gap_sec <= config.break_threshold_sec => {
                TaskKind::NoActivity
            }
            _ => TaskKind::Break,
        };

        Some(TaskObject::gap(&task.record, kind, self.cursor, task.record.start))
    }

    fn advance(&mut self, task: &TaskObject) {
        if task.record.finish > self.cursor {
            self.cursor = task.record.finish;
        }
        self.last_job = Some(task.record.job_code.trim().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ShiftRecord, BREAK_TASK_TYPE, NO_ACTIVITY_TASK_TYPE, UNASSIGNED_JOB};
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap()
    }

    fn task(user: &str, job: &str, start: i64, finish: i64) -> TaskObject {
        let record = ShiftRecord {
            user: user.to_string(),
            client: String::new(),
            warehouse: String::new(),
            wave_code: String::new(),
            job_code: job.to_string(),
            job_type: "MICP".to_string(),
            order_code: String::new(),
            task_type: "Pick".to_string(),
            sku: String::new(),
            quantity: 1.0,
            zone: String::new(),
            location: String::new(),
            start: base() + Duration::seconds(start),
            finish: base() + Duration::seconds(finish),
        };
        TaskObject::from_record(record, 1, 0.3)
    }

    fn synthetic(tasks: &[TaskObject]) -> Vec<&TaskObject> {
        tasks.iter().filter(|t| t.is_synthetic()).collect()
    }

    #[test]
    fn test_short_gap_inside_job_is_no_activity() {
        let tasks = vec![task("u1", "J1", 0, 30), task("u1", "J1", 90, 120)];
        let filled = GapInjector::inject(tasks, &EngineConfig::default());

        let gaps = synthetic(&filled);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].kind, TaskKind::NoActivity);
        assert_eq!(gaps[0].record.job_code, "J1");
        assert_eq!(gaps[0].record.task_type, NO_ACTIVITY_TASK_TYPE);
        assert_eq!(gaps[0].unproductive_duration_sec, 60.0);
        assert_eq!(gaps[0].productive_duration_sec, 0.0);
        assert_eq!(filled[1].kind, TaskKind::NoActivity);
    }

    #[test]
    fn test_gap_between_jobs_is_break() {
        let tasks = vec![task("u1", "J1", 0, 30), task("u1", "J2", 630, 660)];
        let filled = GapInjector::inject(tasks, &EngineConfig::default());

        let gaps = synthetic(&filled);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].kind, TaskKind::Break);
        assert_eq!(gaps[0].record.job_code, UNASSIGNED_JOB);
        assert_eq!(gaps[0].record.task_type, BREAK_TASK_TYPE);
        assert_eq!(gaps[0].unproductive_duration_sec, 600.0);
    }

    #[test]
    fn test_short_gap_between_jobs_is_still_break() {
        let tasks = vec![task("u1", "J1", 0, 30), task("u1", "J2", 40, 60)];
        let filled = GapInjector::inject(tasks, &EngineConfig::default());
        assert_eq!(synthetic(&filled)[0].kind, TaskKind::Break);
    }

    #[test]
    fn test_long_pause_inside_job_is_break() {
        let tasks = vec![task("u1", "J1", 0, 30), task("u1", "J1", 930, 960)];
        let filled = GapInjector::inject(tasks, &EngineConfig::default());
        let gaps = synthetic(&filled);
        assert_eq!(gaps[0].kind, TaskKind::Break);
        assert_eq!(gaps[0].record.job_code, UNASSIGNED_JOB);
    }

    #[test]
    fn test_off_shift_gap_not_filled() {
        let tasks = vec![task("u1", "J1", 0, 30), task("u1", "J2", 30 + 7200, 7300)];
        let filled = GapInjector::inject(tasks, &EngineConfig::default());
        assert!(synthetic(&filled).is_empty());
    }

    #[test]
    fn test_no_leading_gap_without_anchor() {
        let tasks = vec![task("u1", "J1", 600, 630)];
        let filled = GapInjector::inject(tasks, &EngineConfig::default());
        assert_eq!(filled.len(), 1);
    }

    #[test]
    fn test_anchor_seeds_leading_break() {
        let mut config = EngineConfig::default();
        config.shift_starts.insert("u1".to_string(), base());

        let tasks = vec![task("u1", "J1", 600, 630)];
        let filled = GapInjector::inject(tasks, &config);

        assert_eq!(filled.len(), 2);
        assert_eq!(filled[0].kind, TaskKind::Break);
        assert_eq!(filled[0].record.start, base());
        assert_eq!(filled[0].unproductive_duration_sec, 600.0);
    }

    #[test]
    fn test_overlap_advances_cursor_to_max_finish() {
        // Second task ends inside the first; the third starts right at the first's finish
        let tasks = vec![
            task("u1", "J1", 0, 100),
            task("u1", "J1", 10, 20),
            task("u1", "J1", 100, 110),
        ];
        let filled = GapInjector::inject(tasks, &EngineConfig::default());
        assert!(synthetic(&filled).is_empty());
    }

    #[test]
    fn test_users_are_independent() {
        let tasks = vec![task("u1", "J1", 0, 30), task("u2", "J1", 500, 530)];
        let filled = GapInjector::inject(tasks, &EngineConfig::default());
        assert!(synthetic(&filled).is_empty());
    }
}
