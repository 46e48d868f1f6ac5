use domain::{
    model::{
        entity::{Application, Cluster, Command},
        vo::Criterion,
    },
    service::CatalogService,
};

use crate::infrastructure::database::JsonDb;

impl JsonDb {
    fn command_runs_on(command: &Command, cluster: &Cluster) -> bool {
        command
            .cluster_criteria
            .iter()
            .any(|criterion| criterion.matches(&cluster.id, &cluster.metadata))
    }
}

#[async_trait::async_trait]
impl CatalogService for JsonDb {
    async fn find_commands_matching_criterion(
        &self,
        criterion: &Criterion,
    ) -> anyhow::Result<Vec<Command>> {
        Ok(self
            .catalog
            .commands
            .iter()
            .filter(|c| criterion.matches(&c.id, &c.metadata))
            .cloned()
            .collect())
    }

    async fn find_clusters_matching_criterion(
        &self,
        criterion: &Criterion,
    ) -> anyhow::Result<Vec<Cluster>> {
        Ok(self
            .catalog
            .clusters
            .iter()
            .filter(|c| criterion.matches(&c.id, &c.metadata))
            .cloned()
            .collect())
    }

    async fn find_clusters_and_commands_for_criteria(
        &self,
        cluster_criteria: &[Criterion],
        command_criterion: &Criterion,
    ) -> anyhow::Result<Vec<(Cluster, String)>> {
        let commands: Vec<&Command> = self
            .catalog
            .commands
            .iter()
            .filter(|c| command_criterion.matches(&c.id, &c.metadata))
            .collect();

        for criterion in cluster_criteria {
            let pairs: Vec<(Cluster, String)> = self
                .catalog
                .clusters
                .iter()
                .filter(|cluster| criterion.matches(&cluster.id, &cluster.metadata))
                .filter_map(|cluster| {
                    commands
                        .iter()
                        .find(|command| Self::command_runs_on(command, cluster))
                        .map(|command| (cluster.clone(), command.id.clone()))
                })
                .collect();
            if !pairs.is_empty() {
                return Ok(pairs);
            }
        }

        Ok(Vec::new())
    }

    async fn get_command(&self, id: &str) -> anyhow::Result<Option<Command>> {
        Ok(self.catalog.commands.iter().find(|c| c.id == id).cloned())
    }

    async fn get_applications_for_command(&self, id: &str) -> anyhow::Result<Vec<Application>> {
        let command = self
            .catalog
            .commands
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| anyhow::anyhow!("No command with id {id}"))?;

        let mut applications = Vec::with_capacity(command.application_ids.len());
        for app_id in &command.application_ids {
            match self.catalog.applications.iter().find(|a| &a.id == app_id) {
                Some(application) => applications.push(application.clone()),
                None => anyhow::bail!("Command {id} refers to missing application {app_id}"),
            }
        }
        Ok(applications)
    }

    async fn get_application(&self, id: &str) -> anyhow::Result<Option<Application>> {
        Ok(self.catalog.applications.iter().find(|a| a.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use indoc::indoc;

    use super::*;
    use crate::infrastructure::database::Catalog;

    fn db() -> JsonDb {
        let catalog: Catalog = serde_json::from_str(indoc! {r#"
            {
              "clusters": [
                { "id": "c1", "metadata": { "name": "prod", "user": "admin", "version": "1", "status": "UP", "tags": ["sched:sla", "type:yarn"] } },
                { "id": "c2", "metadata": { "name": "adhoc", "user": "admin", "version": "1", "status": "UP", "tags": ["sched:adhoc", "type:yarn"] } }
              ],
              "commands": [
                {
                  "id": "spark",
                  "metadata": { "name": "spark", "user": "admin", "version": "3", "status": "ACTIVE", "tags": ["type:spark"] },
                  "executable": ["spark-submit"],
                  "clusterCriteria": [{ "tags": ["sched:adhoc"] }],
                  "applicationIds": ["hadoop"]
                }
              ],
              "applications": [
                { "id": "hadoop", "metadata": { "name": "hadoop", "user": "admin", "version": "3", "status": "ACTIVE" } }
              ]
            }
        "#})
        .unwrap();
        JsonDb::with_jobs(catalog, HashMap::new(), std::env::temp_dir())
    }

    fn criterion(tags: &[&str]) -> Criterion {
        Criterion::builder()
            .tags(tags.iter().map(|t| t.to_string()).collect::<std::collections::BTreeSet<_>>())
            .build()
    }

    #[tokio::test]
    async fn queries_filter_by_criterion() {
        let db = db();

        let clusters = db
            .find_clusters_matching_criterion(&criterion(&["type:yarn"]))
            .await
            .unwrap();
        assert_eq!(clusters.len(), 2);

        let commands = db
            .find_commands_matching_criterion(&criterion(&["type:spark"]))
            .await
            .unwrap();
        assert_eq!(commands[0].id, "spark");

        let apps = db.get_applications_for_command("spark").await.unwrap();
        assert_eq!(apps[0].id, "hadoop");
        assert!(db.get_application("pig").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn combined_query_takes_first_matching_criterion() {
        let db = db();

        let pairs = db
            .find_clusters_and_commands_for_criteria(
                &[criterion(&["sched:sla"]), criterion(&["type:yarn"])],
                &criterion(&["type:spark"]),
            )
            .await
            .unwrap();

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.id, "c2");
        assert_eq!(pairs[0].1, "spark");
    }
}
