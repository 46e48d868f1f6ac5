use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use domain::{
    error::JobError,
    model::vo::JobEvent,
    service::{JobEventPublisher, JobStateService, LaunchTask, ScheduledTask, TaskScheduler},
};
use typed_builder::TypedBuilder;

#[derive(Default)]
struct JobEntry {
    /// In MB.
    memory: u32,
    active: bool,
    task: Option<Arc<dyn ScheduledTask>>,
}

#[derive(TypedBuilder)]
pub struct JobStateServiceImpl {
    scheduler: Arc<dyn TaskScheduler>,
    publisher: Arc<dyn JobEventPublisher>,
    #[builder(default, setter(skip))]
    jobs: DashMap<String, JobEntry>,
    #[builder(default, setter(skip))]
    cancel_failures: AtomicU64,
}

impl JobStateService for JobStateServiceImpl {
    fn init(&self, id: &str) {
        self.jobs.entry(id.to_owned()).or_default();
        tracing::debug!(job_id = %id, "Job registered");
    }

    fn schedule(&self, id: &str, memory: u32, task: LaunchTask) -> Result<(), JobError> {
        {
            let mut job = self
                .jobs
                .get_mut(id)
                .ok_or_else(|| JobError::JobNotFound(id.to_owned()))?;
            job.memory = memory;
            job.active = true;
            job.task = Some(self.scheduler.schedule(task, Utc::now()));
        }

        self.publisher.publish(JobEvent::Scheduled {
            job_id: id.to_owned(),
            memory,
        });
        tracing::info!(job_id = %id, memory, "Job scheduled");
        Ok(())
    }

    fn done(&self, id: &str) {
        let Some((_, job)) = self.jobs.remove(id) else {
            return;
        };
        let Some(task) = job.task else {
            return;
        };
        if !task.is_finished() && !task.cancel() {
            let failures = self.cancel_failures.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::warn!(job_id = %id, failures, "Failed to cancel launch task");
        }
    }

    fn job_exists(&self, id: &str) -> bool {
        self.jobs.contains_key(id)
    }

    fn used_memory(&self) -> u32 {
        self.jobs
            .iter()
            .filter(|job| job.active)
            .map(|job| job.memory)
            .sum()
    }

    fn active_job_count(&self) -> usize {
        self.jobs.iter().filter(|job| job.active).count()
    }

    fn cancel_failures(&self) -> u64 {
        self.cancel_failures.load(Ordering::Relaxed)
    }
}
