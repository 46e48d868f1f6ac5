use std::sync::Arc;

use anyhow::Context;
use domain::{
    error::JobError,
    model::entity::{JobRequest, JobStatus, ResolvedJob},
    service::{
        JobCoordinatorService, JobKillService, JobLauncher, JobPersistenceService,
        JobResolverService, JobSearchService, JobStateService, LaunchTask,
    },
};
use tokio::sync::Mutex;
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, TypedBuilder)]
pub struct CoordinatorSettings {
    /// In MB.
    #[builder(default = 10240)]
    pub max_job_memory: u32,
    /// In MB.
    #[builder(default = 30720)]
    pub max_system_memory: u32,
    /// Maximum number of active jobs per user, unlimited when `None`.
    #[builder(default, setter(strip_option))]
    pub user_limit: Option<u64>,
}

#[derive(TypedBuilder)]
pub struct JobCoordinatorServiceImpl {
    persistence: Arc<dyn JobPersistenceService>,
    resolver: Arc<dyn JobResolverService>,
    state: Arc<dyn JobStateService>,
    search: Arc<dyn JobSearchService>,
    kill: Arc<dyn JobKillService>,
    launcher: Arc<dyn JobLauncher>,
    settings: CoordinatorSettings,
    /// Held while checking and reserving node memory.
    #[builder(default, setter(skip))]
    admission: Mutex<()>,
}

#[async_trait::async_trait]
impl JobCoordinatorService for JobCoordinatorServiceImpl {
    async fn coordinate_job(&self, id: &str, request: JobRequest) -> Result<String, JobError> {
        let mut reached = JobStatus::Init;

        if let Err(e) = self.try_coordinate(id, &request, &mut reached).await {
            tracing::error!(job_id = %id, "Failed to coordinate job: {e}");
            if !matches!(e, JobError::Conflict(_)) {
                self.compensate(id, reached, &e).await;
            }
            return Err(e);
        }

        Ok(id.to_owned())
    }

    async fn kill_job(&self, id: &str, reason: &str) -> Result<(), JobError> {
        self.kill.kill_job(id, reason).await
    }
}

impl JobCoordinatorServiceImpl {
    async fn try_coordinate(
        &self,
        id: &str,
        request: &JobRequest,
        reached: &mut JobStatus,
    ) -> Result<(), JobError> {
        self.persistence.save_job_request(id, request).await?;
        self.state.init(id);

        let resolved = self.resolver.resolve_job(id).await?;
        *reached = JobStatus::Resolved;
        let memory = resolved.memory();

        self.persistence
            .update_job_with_runtime_environment(
                id,
                resolved.cluster_id(),
                resolved.command_id(),
                &resolved.application_ids(),
                memory,
            )
            .await
            .context("Failed to save job runtime environment")?;

        let max = self.settings.max_job_memory;
        if memory > max {
            return Err(JobError::ResourceLimitExceeded {
                requested: memory,
                max,
            });
        }

        if let Some(limit) = self.settings.user_limit {
            let user = &request.metadata.user;
            let active = self
                .search
                .get_active_job_count_for_user(user)
                .await
                .context("Failed to count active jobs of user")?;
            if active >= limit {
                return Err(JobError::UserLimitExceeded {
                    user: user.clone(),
                    active,
                    limit,
                });
            }
        }

        let _admission = self.admission.lock().await;
        let used = self.state.used_memory();
        let max = self.settings.max_system_memory;
        if used.saturating_add(memory) > max {
            return Err(JobError::NodeCapacityUnavailable {
                job_id: id.to_owned(),
                used,
                max,
                requested: memory,
            });
        }
        self.state.schedule(id, memory, self.launch_task(resolved))?;

        Ok(())
    }

    fn launch_task(&self, job: ResolvedJob) -> LaunchTask {
        let launcher = Arc::clone(&self.launcher);
        Box::pin(async move {
            if let Err(e) = launcher.launch(&job).await {
                tracing::error!(job_id = %job.job_id(), "Failed to launch job: {e:#}");
            }
        })
    }

    /// Releases the job and moves it out of the status it reached.
    async fn compensate(&self, id: &str, reached: JobStatus, error: &JobError) {
        if !self.state.job_exists(id) {
            return;
        }
        self.state.done(id);

        let status = error.failure_status();
        if let Err(e) = self
            .persistence
            .update_job_status(id, reached, status, &error.to_string())
            .await
        {
            tracing::error!(job_id = %id, "Failed to move job from {reached} to {status}: {e:#}");
        }
    }
}
