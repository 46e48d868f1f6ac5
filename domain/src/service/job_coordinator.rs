use crate::error::JobError;
use crate::model::entity::JobRequest;

#[cfg_attr(feature = "mockall", mockall::automock)]
#[async_trait::async_trait]
pub trait JobCoordinatorService: Send + Sync {
    /// Persists, resolves and admits a job, returning its id once the launch is scheduled.
    async fn coordinate_job(&self, id: &str, request: JobRequest) -> Result<String, JobError>;
    async fn kill_job(&self, id: &str, reason: &str) -> Result<(), JobError>;
}
