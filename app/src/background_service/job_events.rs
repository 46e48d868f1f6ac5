use std::sync::Arc;

use domain::{
    model::vo::{JobEvent, JobFinishedReason},
    service::{JobPersistenceService, JobStateService},
};
use tokio_util::sync::CancellationToken;

/// Applies job events to persisted statuses and to the node's job registry.
pub struct JobEventDispatcher {
    persistence: Arc<dyn JobPersistenceService>,
    state: Arc<dyn JobStateService>,
    events: flume::Receiver<JobEvent>,
}

impl JobEventDispatcher {
    pub fn new(
        persistence: Arc<dyn JobPersistenceService>,
        state: Arc<dyn JobStateService>,
        events: flume::Receiver<JobEvent>,
    ) -> Self {
        Self {
            persistence,
            state,
            events,
        }
    }

    pub async fn run(self, token: CancellationToken) {
        loop {
            let event = tokio::select! {
                _ = token.cancelled() => break,
                event = self.events.recv_async() => event,
            };
            match event {
                Ok(event) => self.dispatch(event).await,
                Err(_) => break,
            }
        }
        tracing::debug!("Job event dispatcher stopped");
    }

    async fn dispatch(&self, event: JobEvent) {
        match event {
            JobEvent::Scheduled { job_id, memory } => {
                tracing::debug!(job_id = %job_id, memory, "Job scheduled");
            }
            JobEvent::Finished {
                job_id,
                reason,
                message,
            } => {
                self.finish(&job_id, reason, &message).await;
                self.state.done(&job_id);
            }
        }
    }

    async fn finish(&self, id: &str, reason: JobFinishedReason, message: &str) {
        let status = match self.persistence.get_job_status(id).await {
            Ok(Some(status)) => status,
            Ok(None) => {
                tracing::warn!(job_id = %id, "Finished job is unknown");
                return;
            }
            Err(e) => {
                tracing::error!(job_id = %id, "Failed to read status of finished job: {e:#}");
                return;
            }
        };
        if status.is_finished() {
            tracing::debug!(job_id = %id, "Job already {status}");
            return;
        }
        if let Err(e) = self
            .persistence
            .update_job_status(id, status, reason.status(), message)
            .await
        {
            tracing::error!(job_id = %id, "Failed to record job completion: {e:#}");
        }
    }
}
