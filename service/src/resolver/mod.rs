mod environment;
mod selection;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use domain::{
    error::ResolutionError,
    model::{
        entity::{
            Application, Cluster, Command, ExecutionResource, JobEnvironment, JobRequest,
            JobSpecification, ResolvedJob,
        },
        vo::{ClusterSelectionContext, CommandSelectionContext, SelectionResult},
    },
    service::{
        CatalogService, ClusterLoadBalancer, ClusterSelector, CommandSelector,
        JobPersistenceService, JobResolverService,
    },
};
use serde::Deserialize;
use typed_builder::TypedBuilder;

use self::environment::EnvironmentInput;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Resolves the command first, then pairs its cluster criteria with the job's.
    #[default]
    PerCriterion,
    /// One combined catalog query, ties broken by the cluster load balancers.
    Legacy,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct ResolverSettings {
    #[builder(default)]
    pub mode: ResolutionMode,
    /// In MB.
    #[builder(default = 1024)]
    pub default_job_memory: u32,
    /// In seconds.
    #[builder(default)]
    pub default_timeout: Option<u32>,
    #[builder(setter(into))]
    pub jobs_dir: PathBuf,
    #[builder(setter(into))]
    pub archives_dir: PathBuf,
}

#[derive(TypedBuilder)]
pub struct JobResolverServiceImpl {
    persistence: Arc<dyn JobPersistenceService>,
    catalog: Arc<dyn CatalogService>,
    #[builder(default)]
    cluster_selectors: Vec<Arc<dyn ClusterSelector>>,
    #[builder(default)]
    command_selectors: Vec<Arc<dyn CommandSelector>>,
    #[builder(default)]
    load_balancers: Vec<Arc<dyn ClusterLoadBalancer>>,
    settings: ResolverSettings,
}

#[async_trait::async_trait]
impl JobResolverService for JobResolverServiceImpl {
    async fn resolve_job(&self, id: &str) -> Result<ResolvedJob, ResolutionError> {
        let status = self
            .persistence
            .get_job_status(id)
            .await
            .context("Failed to read job status")?
            .ok_or_else(|| ResolutionError::JobNotFound(id.to_owned()))?;
        if !status.is_resolvable() {
            return Err(ResolutionError::NotResolvable {
                id: id.to_owned(),
                status,
            });
        }

        let request = self
            .persistence
            .get_job_request(id)
            .await
            .context("Failed to load job request")?;
        let resolved = self.resolve(id, Arc::new(request)).await?;

        self.persistence
            .save_resolved_job(id, &resolved)
            .await
            .context("Failed to save resolved job")?;
        tracing::info!(
            job_id = %id,
            cluster_id = %resolved.cluster_id(),
            command_id = %resolved.command_id(),
            "Job resolved"
        );

        Ok(resolved)
    }

    async fn resolve_job_request(
        &self,
        id: &str,
        request: &JobRequest,
    ) -> Result<ResolvedJob, ResolutionError> {
        self.resolve(id, Arc::new(request.clone())).await
    }
}

impl JobResolverServiceImpl {
    async fn resolve(
        &self,
        id: &str,
        request: Arc<JobRequest>,
    ) -> Result<ResolvedJob, ResolutionError> {
        let (cluster, command) = match self.settings.mode {
            ResolutionMode::PerCriterion => {
                let command = self.resolve_command(id, &request).await?;
                let cluster = self.resolve_cluster(id, &request, &command).await?;
                (cluster, command)
            }
            ResolutionMode::Legacy => self.resolve_cluster_and_command(id, &request).await?,
        };
        let applications = self.resolve_applications(&request, &command).await?;
        let memory = request
            .requested_memory
            .or(command.memory)
            .unwrap_or(self.settings.default_job_memory);
        let environment_variables = environment::environment_variables(&EnvironmentInput {
            job_id: id,
            request: &request,
            cluster: &cluster,
            command: &command,
            memory,
        });

        let agent_config = &request.agent_config;
        let archive_location = (!agent_config.archiving_disabled).then(|| {
            self.settings
                .archives_dir
                .join(format!("{id}.tar.gz"))
                .to_string_lossy()
                .into_owned()
        });
        let job_directory = agent_config
            .requested_job_directory
            .clone()
            .unwrap_or_else(|| self.settings.jobs_dir.clone());

        Ok(ResolvedJob {
            specification: JobSpecification {
                executable: command.executable,
                arguments: request.command_args.clone(),
                job: ExecutionResource {
                    id: id.to_owned(),
                    environment: request.resources.clone(),
                },
                cluster: ExecutionResource {
                    id: cluster.id,
                    environment: cluster.resources,
                },
                command: ExecutionResource {
                    id: command.id,
                    environment: command.resources,
                },
                applications: applications
                    .into_iter()
                    .map(|app| ExecutionResource {
                        id: app.id,
                        environment: app.resources,
                    })
                    .collect(),
                environment_variables: environment_variables.clone(),
                interactive: agent_config.interactive,
                job_directory,
                archive_location,
                timeout: agent_config.timeout.or(self.settings.default_timeout),
            },
            environment: JobEnvironment {
                memory,
                environment_variables,
            },
            metadata: request.metadata.clone(),
        })
    }

    async fn resolve_command(
        &self,
        id: &str,
        request: &Arc<JobRequest>,
    ) -> Result<Command, ResolutionError> {
        let mut commands = self
            .catalog
            .find_commands_matching_criterion(&request.criteria.command_criterion)
            .await
            .context("Failed to find commands matching the command criterion")?;

        match commands.len() {
            0 => Err(ResolutionError::NoCommandFound),
            1 => Ok(commands.swap_remove(0)),
            _ => {
                let context = CommandSelectionContext {
                    job_id: id.to_owned(),
                    job_request: Arc::clone(request),
                };
                selection::select_in_order(
                    id,
                    &self.command_selectors,
                    &commands,
                    command_id,
                    |selector| selector.name(),
                    |selector| selector.select(&commands, &context),
                )
                .map_err(|rationale| ResolutionError::NoCommandSelected { rationale })
            }
        }
    }

    /// Tries every (command criterion, job criterion) pair, command criteria first, until one
    /// yields a cluster.
    async fn resolve_cluster(
        &self,
        id: &str,
        request: &Arc<JobRequest>,
        command: &Command,
    ) -> Result<Cluster, ResolutionError> {
        let context = ClusterSelectionContext {
            job_id: id.to_owned(),
            job_request: Arc::clone(request),
            command: Some(command.clone()),
        };
        let mut unselected = None;

        for command_criterion in &command.cluster_criteria {
            for job_criterion in &request.criteria.cluster_criteria {
                let criterion = match command_criterion.merge(job_criterion) {
                    Ok(criterion) => criterion,
                    Err(e) => {
                        tracing::debug!(job_id = %id, "Skipping cluster criteria pair: {e}");
                        continue;
                    }
                };
                let mut clusters = self
                    .catalog
                    .find_clusters_matching_criterion(&criterion)
                    .await
                    .context("Failed to find clusters matching criterion")?;

                match clusters.len() {
                    0 => continue,
                    1 => return Ok(clusters.swap_remove(0)),
                    _ => match selection::select_in_order(
                        id,
                        &self.cluster_selectors,
                        &clusters,
                        cluster_id,
                        |selector| selector.name(),
                        |selector| selector.select(&clusters, &context),
                    ) {
                        Ok(cluster) => return Ok(cluster),
                        Err(rationale) => unselected = Some(rationale),
                    },
                }
            }
        }

        Err(match unselected {
            Some(rationale) => ResolutionError::NoClusterSelected { rationale },
            None => ResolutionError::NoClusterFound,
        })
    }

    async fn resolve_cluster_and_command(
        &self,
        id: &str,
        request: &Arc<JobRequest>,
    ) -> Result<(Cluster, Command), ResolutionError> {
        let criteria = &request.criteria;
        let mut candidates = self
            .catalog
            .find_clusters_and_commands_for_criteria(
                &criteria.cluster_criteria,
                &criteria.command_criterion,
            )
            .await
            .context("Failed to find clusters and commands for criteria")?;

        let (cluster, command_id) = match candidates.len() {
            0 => return Err(ResolutionError::NoClusterFound),
            1 => candidates.swap_remove(0),
            _ => {
                let clusters: Vec<Cluster> = candidates.iter().map(|(c, _)| c.clone()).collect();
                let chosen = selection::select_in_order(
                    id,
                    &self.load_balancers,
                    &clusters,
                    cluster_id,
                    |balancer| balancer.name(),
                    |balancer| {
                        let cluster = balancer.select_cluster(&clusters, request)?;
                        Ok(match cluster {
                            Some(resource) => SelectionResult::Selected {
                                resource,
                                rationale: None,
                            },
                            None => SelectionResult::NoPreference { rationale: None },
                        })
                    },
                )
                .map_err(|rationale| ResolutionError::NoClusterSelected { rationale })?;

                candidates
                    .into_iter()
                    .find(|(cluster, _)| cluster.id == chosen.id)
                    .ok_or_else(|| ResolutionError::NoClusterSelected {
                        rationale: format!("Cluster {} isn't a candidate", chosen.id),
                    })?
            }
        };

        let command = self
            .catalog
            .get_command(&command_id)
            .await
            .context("Failed to load command")?
            .ok_or(ResolutionError::NoCommandFound)?;

        Ok((cluster, command))
    }

    async fn resolve_applications(
        &self,
        request: &JobRequest,
        command: &Command,
    ) -> Result<Vec<Application>, ResolutionError> {
        let ids = &request.criteria.application_ids;
        if ids.is_empty() {
            let applications = self
                .catalog
                .get_applications_for_command(&command.id)
                .await
                .context("Failed to load applications of command")?;
            return Ok(applications);
        }

        let mut applications = Vec::with_capacity(ids.len());
        for app_id in ids {
            let application = self
                .catalog
                .get_application(app_id)
                .await
                .context("Failed to load application")?
                .ok_or_else(|| ResolutionError::ApplicationNotFound(app_id.clone()))?;
            applications.push(application);
        }

        Ok(applications)
    }
}

fn cluster_id(cluster: &Cluster) -> &str {
    &cluster.id
}

fn command_id(command: &Command) -> &str {
    &command.id
}
