//! Temporal smoothing
//!
//! Split scans and duplicate lines show up as short, back-to-back tasks with the
//! same user, job, location and SKU. The smoother groups such runs into clusters
//! and gives every member the cluster's mean durations.

use crate::types::TaskObject;

/// Stable sort by (trimmed user, start)
pub fn sort_by_user_start(tasks: &mut [TaskObject]) {
    tasks.sort_by(|a, b| {
        a.record
            .user
            .trim()
            .cmp(b.record.user.trim())
            .then(a.record.start.cmp(&b.record.start))
    });
}

/// Smoother for collapsing fragmented scans
pub struct TemporalSmoother;

impl TemporalSmoother {
    /// Re-sort tasks by (user, start) and average contiguous clusters.
    ///
    /// The overwrite keeps each field's cluster total but redistributes it
    /// evenly, so individual members lose their own observed durations.
    pub fn smooth(mut tasks: Vec<TaskObject>, tolerance_sec: f64) -> Vec<TaskObject> {
        sort_by_user_start(&mut tasks);

        let mut clusters = 0;
        let mut cluster_start = 0;
        for i in 1..=tasks.len() {
            let joins = i < tasks.len() && joins_cluster(&tasks[i - 1], &tasks[i], tolerance_sec);
            if joins {
                continue;
            }
            if i - cluster_start > 1 {
                average_cluster(&mut tasks[cluster_start..i]);
                clusters += 1;
            }
            cluster_start = i;
        }

        tracing::debug!(tasks = tasks.len(), clusters, "smoothed tasks");
        tasks
    }
}

/// Whether `next` continues the cluster whose last member is `prev`
fn joins_cluster(prev: &TaskObject, next: &TaskObject, tolerance_sec: f64) -> bool {
    let (p, n) = (&prev.record, &next.record);
    if p.user.trim() != n.user.trim()
        || p.job_code.trim() != n.job_code.trim()
        || p.location.trim() != n.location.trim()
        || p.sku.trim() != n.sku.trim()
    {
        return false;
    }

    let gap_from_finish = (n.start - p.finish).num_milliseconds() as f64 / 1000.0;
    let gap_from_start = (n.start - p.start).num_milliseconds() as f64 / 1000.0;
    gap_from_finish < tolerance_sec || gap_from_start < tolerance_sec
}

fn average_cluster(cluster: &mut [TaskObject]) {
    let n = cluster.len() as f64;
    let mean = |f: fn(&TaskObject) -> f64| cluster.iter().map(f).sum::<f64>() / n;

    let productive = mean(|t| t.productive_duration_sec);
    let unproductive = mean(|t| t.unproductive_duration_sec);
    let direct = mean(|t| t.task_direct_time_sec);
    let travel = mean(|t| t.task_travel_time_sec);

    let size = cluster.len();
    for task in cluster.iter_mut() {
        task.productive_duration_sec = productive;
        task.unproductive_duration_sec = unproductive;
        task.task_direct_time_sec = direct;
        task.task_travel_time_sec = travel;
        task.cluster_size = size;
    }
}
