use crate::error::JobError;
use crate::model::entity::{JobExecution, JobRequest, JobStatus, ResolvedJob};

#[cfg_attr(feature = "mockall", mockall::automock)]
#[async_trait::async_trait]
pub trait JobPersistenceService: Send + Sync {
    /// Stores a new job in [`JobStatus::Init`], failing with [`JobError::Conflict`] when the id is
    /// taken.
    async fn save_job_request(&self, id: &str, request: &JobRequest) -> Result<(), JobError>;
    async fn get_job_request(&self, id: &str) -> anyhow::Result<JobRequest>;
    async fn get_job_status(&self, id: &str) -> anyhow::Result<Option<JobStatus>>;
    /// Compare and set. Fails if the job isn't in `expected` anymore.
    async fn update_job_status(
        &self,
        id: &str,
        expected: JobStatus,
        status: JobStatus,
        message: &str,
    ) -> anyhow::Result<()>;
    /// Stores the resolution result and moves the job to [`JobStatus::Resolved`].
    async fn save_resolved_job(&self, id: &str, resolved: &ResolvedJob) -> anyhow::Result<()>;
    async fn update_job_with_runtime_environment(
        &self,
        id: &str,
        cluster_id: &str,
        command_id: &str,
        application_ids: &[String],
        memory: u32,
    ) -> anyhow::Result<()>;
    async fn is_agent_job(&self, id: &str) -> anyhow::Result<bool>;
    async fn update_job_execution(&self, id: &str, execution: JobExecution) -> anyhow::Result<()>;
}
