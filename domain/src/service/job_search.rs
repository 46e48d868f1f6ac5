use crate::model::entity::JobExecution;

#[cfg_attr(feature = "mockall", mockall::automock)]
#[async_trait::async_trait]
pub trait JobSearchService: Send + Sync {
    async fn get_active_job_count_for_user(&self, user: &str) -> anyhow::Result<u64>;
    async fn get_job_execution(&self, id: &str) -> anyhow::Result<Option<JobExecution>>;
}
