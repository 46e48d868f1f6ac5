use crate::error::ResolutionError;
use crate::model::entity::{JobRequest, ResolvedJob};

#[cfg_attr(feature = "mockall", mockall::automock)]
#[async_trait::async_trait]
pub trait JobResolverService: Send + Sync {
    /// Resolves a persisted job and saves the result.
    async fn resolve_job(&self, id: &str) -> Result<ResolvedJob, ResolutionError>;
    /// Resolves without reading or writing any job state.
    async fn resolve_job_request(
        &self,
        id: &str,
        request: &JobRequest,
    ) -> Result<ResolvedJob, ResolutionError>;
}
