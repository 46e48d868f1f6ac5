use crate::model::entity::ResolvedJob;

#[cfg_attr(feature = "mockall", mockall::automock)]
#[async_trait::async_trait]
pub trait JobLauncher: Send + Sync {
    async fn launch(&self, job: &ResolvedJob) -> anyhow::Result<()>;
}
