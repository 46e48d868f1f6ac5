use crate::error::JobError;

#[cfg_attr(feature = "mockall", mockall::automock)]
#[async_trait::async_trait]
pub trait JobKillService: Send + Sync {
    async fn kill_job(&self, id: &str, reason: &str) -> Result<(), JobError>;
}
