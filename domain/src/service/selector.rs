use crate::model::entity::{Cluster, Command, JobRequest};
use crate::model::vo::{ClusterSelectionContext, CommandSelectionContext, SelectionResult};

#[cfg_attr(feature = "mockall", mockall::automock)]
pub trait ClusterSelector: Send + Sync {
    fn name(&self) -> &'static str;
    fn select(
        &self,
        clusters: &[Cluster],
        context: &ClusterSelectionContext,
    ) -> anyhow::Result<SelectionResult<Cluster>>;
}

#[cfg_attr(feature = "mockall", mockall::automock)]
pub trait CommandSelector: Send + Sync {
    fn name(&self) -> &'static str;
    fn select(
        &self,
        commands: &[Command],
        context: &CommandSelectionContext,
    ) -> anyhow::Result<SelectionResult<Command>>;
}

/// Older cluster selection interface where `None` means no preference.
#[cfg_attr(feature = "mockall", mockall::automock)]
pub trait ClusterLoadBalancer: Send + Sync {
    fn name(&self) -> &'static str;
    fn select_cluster(
        &self,
        clusters: &[Cluster],
        request: &JobRequest,
    ) -> anyhow::Result<Option<Cluster>>;
}
