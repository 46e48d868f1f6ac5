use crate::model::entity::{Application, Cluster, Command};
use crate::model::vo::Criterion;

/// Read only view of registered clusters, commands and applications.
#[cfg_attr(feature = "mockall", mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    async fn find_commands_matching_criterion(
        &self,
        criterion: &Criterion,
    ) -> anyhow::Result<Vec<Command>>;
    async fn find_clusters_matching_criterion(
        &self,
        criterion: &Criterion,
    ) -> anyhow::Result<Vec<Cluster>>;
    /// Pairs each matching cluster with the id of the command to run on it.
    async fn find_clusters_and_commands_for_criteria(
        &self,
        cluster_criteria: &[Criterion],
        command_criterion: &Criterion,
    ) -> anyhow::Result<Vec<(Cluster, String)>>;
    async fn get_command(&self, id: &str) -> anyhow::Result<Option<Command>>;
    async fn get_applications_for_command(&self, id: &str) -> anyhow::Result<Vec<Application>>;
    async fn get_application(&self, id: &str) -> anyhow::Result<Option<Application>>;
}
