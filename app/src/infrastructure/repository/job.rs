use chrono::Utc;
use domain::{
    error::JobError,
    model::entity::{JobExecution, JobRequest, JobStatus, ResolvedJob},
    service::{AgentJobKiller, JobPersistenceService, JobSearchService},
};

use crate::infrastructure::database::{JobRecord, JsonDb, RuntimeEnvironment};

impl JsonDb {
    async fn update_record(
        &self,
        id: &str,
        f: impl FnOnce(&mut JobRecord) -> anyhow::Result<()> + Send,
    ) -> anyhow::Result<()> {
        let mut jobs = self.jobs.lock().await;
        let record = jobs
            .get_mut(id)
            .ok_or_else(|| anyhow::anyhow!("No job with id {id}"))?;
        f(record)?;
        record.updated = Utc::now();
        self.save_changed(&jobs).await
    }
}

#[async_trait::async_trait]
impl JobPersistenceService for JsonDb {
    async fn save_job_request(&self, id: &str, request: &JobRequest) -> Result<(), JobError> {
        let mut jobs = self.jobs.lock().await;
        if jobs.contains_key(id) {
            return Err(JobError::Conflict(format!("A job with id {id} already exists")));
        }
        jobs.insert(id.to_owned(), JobRecord::new(request.clone()));
        self.save_changed(&jobs).await?;
        Ok(())
    }

    async fn get_job_request(&self, id: &str) -> anyhow::Result<JobRequest> {
        self.jobs
            .lock()
            .await
            .get(id)
            .map(|record| record.request.clone())
            .ok_or_else(|| anyhow::anyhow!("No job with id {id}"))
    }

    async fn get_job_status(&self, id: &str) -> anyhow::Result<Option<JobStatus>> {
        Ok(self.jobs.lock().await.get(id).map(|record| record.status))
    }

    async fn update_job_status(
        &self,
        id: &str,
        expected: JobStatus,
        status: JobStatus,
        message: &str,
    ) -> anyhow::Result<()> {
        self.update_record(id, |record| {
            if record.status != expected {
                anyhow::bail!(
                    "Job {id} is {} instead of {expected}, not moving it to {status}",
                    record.status
                );
            }
            record.status = status;
            record.status_message = Some(message.to_owned());
            Ok(())
        })
        .await
    }

    async fn save_resolved_job(&self, id: &str, resolved: &ResolvedJob) -> anyhow::Result<()> {
        let resolved = resolved.clone();
        self.update_record(id, move |record| {
            if !record.status.is_resolvable() {
                anyhow::bail!("Job {id} is already {}", record.status);
            }
            record.status = JobStatus::Resolved;
            record.status_message = Some("Job resolved".to_owned());
            record.resolved = Some(resolved);
            Ok(())
        })
        .await
    }

    async fn update_job_with_runtime_environment(
        &self,
        id: &str,
        cluster_id: &str,
        command_id: &str,
        application_ids: &[String],
        memory: u32,
    ) -> anyhow::Result<()> {
        let runtime = RuntimeEnvironment {
            cluster_id: cluster_id.to_owned(),
            command_id: command_id.to_owned(),
            application_ids: application_ids.to_vec(),
            memory,
        };
        self.update_record(id, move |record| {
            record.runtime = Some(runtime);
            Ok(())
        })
        .await
    }

    async fn is_agent_job(&self, id: &str) -> anyhow::Result<bool> {
        self.jobs
            .lock()
            .await
            .get(id)
            .map(|record| record.agent)
            .ok_or_else(|| anyhow::anyhow!("No job with id {id}"))
    }

    async fn update_job_execution(&self, id: &str, execution: JobExecution) -> anyhow::Result<()> {
        self.update_record(id, move |record| {
            record.execution = Some(execution);
            Ok(())
        })
        .await
    }
}

#[async_trait::async_trait]
impl JobSearchService for JsonDb {
    async fn get_active_job_count_for_user(&self, user: &str) -> anyhow::Result<u64> {
        Ok(self
            .jobs
            .lock()
            .await
            .values()
            .filter(|record| record.status.is_active() && record.request.metadata.user == user)
            .count() as u64)
    }

    async fn get_job_execution(&self, id: &str) -> anyhow::Result<Option<JobExecution>> {
        Ok(self
            .jobs
            .lock()
            .await
            .get(id)
            .and_then(|record| record.execution.clone()))
    }
}

#[async_trait::async_trait]
impl AgentJobKiller for JsonDb {
    async fn kill(&self, id: &str, reason: &str) -> anyhow::Result<()> {
        let reason = reason.to_owned();
        self.update_record(id, move |record| {
            if !record.agent {
                anyhow::bail!("Job {id} isn't supervised by an agent");
            }
            record.kill_request = Some(reason);
            Ok(())
        })
        .await
    }
}
