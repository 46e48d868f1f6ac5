use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use domain::{
    error::JobError,
    model::{
        entity::{ExecutionMode, JobStatus},
        vo::{JobEvent, JobFinishedReason},
    },
    service::{
        AgentJobKiller, JobEventPublisher, JobKillService, JobPersistenceService,
        JobSearchService, ProcessChecker, ProcessKiller, ProcessState,
    },
};
use typed_builder::TypedBuilder;

const KILLED_DURING_INIT: &str = "User requested job be killed during initialization";
const KILL_REASON_DIR: &str = "conductor";
const KILL_REASON_FILE: &str = "kill-reason";

#[derive(Debug, Clone, TypedBuilder)]
pub struct KillSettings {
    /// Name of this node, as recorded in job executions.
    #[builder(setter(into))]
    pub hostname: String,
    #[builder(setter(into))]
    pub jobs_dir: PathBuf,
    #[builder(default)]
    pub run_as_user: bool,
}

#[derive(TypedBuilder)]
pub struct JobKillServiceImpl {
    persistence: Arc<dyn JobPersistenceService>,
    search: Arc<dyn JobSearchService>,
    publisher: Arc<dyn JobEventPublisher>,
    process_checker: Arc<dyn ProcessChecker>,
    process_killer: Arc<dyn ProcessKiller>,
    agent_killer: Arc<dyn AgentJobKiller>,
    settings: KillSettings,
}

#[async_trait::async_trait]
impl JobKillService for JobKillServiceImpl {
    async fn kill_job(&self, id: &str, reason: &str) -> Result<(), JobError> {
        let status = self
            .persistence
            .get_job_status(id)
            .await
            .context("Failed to read job status")?
            .ok_or_else(|| JobError::JobNotFound(id.to_owned()))?;
        let mode = if self
            .persistence
            .is_agent_job(id)
            .await
            .context("Failed to read job execution mode")?
        {
            ExecutionMode::Agent
        } else {
            ExecutionMode::Embedded
        };

        match (status, mode) {
            (JobStatus::Init | JobStatus::Resolved, _) => {
                self.publisher.publish(JobEvent::Finished {
                    job_id: id.to_owned(),
                    reason: JobFinishedReason::Killed,
                    message: KILLED_DURING_INIT.to_owned(),
                });
                tracing::info!(job_id = %id, "Job killed before it started: {reason}");
                Ok(())
            }
            (JobStatus::Running, ExecutionMode::Agent) => {
                self.agent_killer
                    .kill(id, reason)
                    .await
                    .context("Failed to signal the job agent")?;
                tracing::info!(job_id = %id, "Kill requested from agent: {reason}");
                Ok(())
            }
            (JobStatus::Running, ExecutionMode::Embedded) => self.kill_process(id, reason).await,
            (finished, _) => {
                tracing::debug!(job_id = %id, "Job already finished with {finished}");
                Ok(())
            }
        }
    }
}

impl JobKillServiceImpl {
    async fn kill_process(&self, id: &str, reason: &str) -> Result<(), JobError> {
        let execution = self
            .search
            .get_job_execution(id)
            .await
            .context("Failed to read job execution")?
            .ok_or_else(|| JobError::Precondition(format!("Job {id} has no execution")))?;

        if execution.exit_code.is_some() {
            tracing::debug!(job_id = %id, "Job process already exited");
            return Ok(());
        }
        if execution.host_name != self.settings.hostname {
            return Err(JobError::InvalidKillTarget {
                id: id.to_owned(),
                host: execution.host_name,
                current: self.settings.hostname.clone(),
            });
        }
        let pid = execution
            .process_id
            .ok_or_else(|| JobError::Precondition(format!("Job {id} has no process id")))?;

        let state = self
            .process_checker
            .check_process(pid)
            .await
            .context("Failed to check job process")?;
        if state == ProcessState::Dead {
            tracing::debug!(job_id = %id, pid, "Job process is gone");
            return Ok(());
        }

        self.process_killer
            .kill(pid, self.settings.run_as_user)
            .await
            .with_context(|| format!("Failed to kill process {pid}"))?;
        let workdir = execution
            .working_directory
            .unwrap_or_else(|| self.settings.jobs_dir.join(id));
        self.write_kill_reason(&workdir, reason).await?;
        tracing::info!(job_id = %id, pid, "Job killed: {reason}");

        Ok(())
    }

    async fn write_kill_reason(&self, workdir: &Path, reason: &str) -> anyhow::Result<()> {
        let dir = workdir.join(KILL_REASON_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let content = serde_json::to_vec(&serde_json::json!({ "killReason": reason }))?;
        let path = dir.join(KILL_REASON_FILE);
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use domain::{
        model::entity::JobExecution,
        service::{
            MockAgentJobKiller, MockJobEventPublisher, MockJobPersistenceService,
            MockJobSearchService, MockProcessChecker, MockProcessKiller,
        },
    };

    use super::*;

    const HOST: &str = "node-a";

    /// Kill service whose collaborators fail the test when touched, unless configured.
    struct Fixture {
        persistence: MockJobPersistenceService,
        search: MockJobSearchService,
        publisher: MockJobEventPublisher,
        checker: MockProcessChecker,
        killer: MockProcessKiller,
        agent: MockAgentJobKiller,
        jobs_dir: PathBuf,
    }

    impl Fixture {
        fn new(status: Option<JobStatus>, agent: bool) -> Self {
            let mut persistence = MockJobPersistenceService::new();
            persistence
                .expect_get_job_status()
                .returning(move |_| Ok(status));
            persistence
                .expect_is_agent_job()
                .returning(move |_| Ok(agent));
            Self {
                persistence,
                search: MockJobSearchService::new(),
                publisher: MockJobEventPublisher::new(),
                checker: MockProcessChecker::new(),
                killer: MockProcessKiller::new(),
                agent: MockAgentJobKiller::new(),
                jobs_dir: std::env::temp_dir().join(uuid::Uuid::new_v4().to_string()),
            }
        }

        fn with_execution(mut self, execution: JobExecution) -> Self {
            self.search
                .expect_get_job_execution()
                .returning(move |_| Ok(Some(execution.clone())));
            self
        }

        fn build(self) -> JobKillServiceImpl {
            JobKillServiceImpl::builder()
                .persistence(Arc::new(self.persistence))
                .search(Arc::new(self.search))
                .publisher(Arc::new(self.publisher))
                .process_checker(Arc::new(self.checker))
                .process_killer(Arc::new(self.killer))
                .agent_killer(Arc::new(self.agent))
                .settings(
                    KillSettings::builder()
                        .hostname(HOST)
                        .jobs_dir(self.jobs_dir)
                        .build(),
                )
                .build()
        }
    }

    fn execution(host: &str, pid: Option<u32>, exit_code: Option<i32>) -> JobExecution {
        JobExecution {
            host_name: host.to_owned(),
            process_id: pid,
            exit_code,
            mode: ExecutionMode::Embedded,
            working_directory: None,
        }
    }

    #[tokio::test]
    async fn unknown_job() {
        let err = Fixture::new(None, false)
            .build()
            .kill_job("ghost", "why")
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::JobNotFound(id) if id == "ghost"));
    }

    #[tokio::test]
    async fn initializing_job_is_finished_without_touching_processes() {
        for status in [JobStatus::Init, JobStatus::Resolved] {
            let mut fixture = Fixture::new(Some(status), false);
            fixture
                .publisher
                .expect_publish()
                .times(1)
                .withf(|event| {
                    matches!(
                        event,
                        JobEvent::Finished { job_id, reason: JobFinishedReason::Killed, message }
                            if job_id == "job1" && message == KILLED_DURING_INIT
                    )
                })
                .return_const(());
            fixture.search.expect_get_job_execution().never();
            fixture.killer.expect_kill().never();

            fixture.build().kill_job("job1", "user").await.unwrap();
        }
    }

    #[tokio::test]
    async fn finished_job_is_left_alone() {
        let mut fixture = Fixture::new(Some(JobStatus::Succeeded), true);
        fixture.agent.expect_kill().never();
        fixture.publisher.expect_publish().never();

        fixture.build().kill_job("job1", "user").await.unwrap();
    }

    #[tokio::test]
    async fn agent_job_is_signalled() {
        let mut fixture = Fixture::new(Some(JobStatus::Running), true);
        fixture
            .agent
            .expect_kill()
            .times(1)
            .withf(|id, reason| id == "job1" && reason == "timeout")
            .returning(|_, _| Ok(()));
        fixture.search.expect_get_job_execution().never();

        fixture.build().kill_job("job1", "timeout").await.unwrap();
    }

    #[tokio::test]
    async fn exited_process_is_not_killed() {
        let mut fixture = Fixture::new(Some(JobStatus::Running), false)
            .with_execution(execution(HOST, Some(42), Some(0)));
        fixture.checker.expect_check_process().never();
        fixture.killer.expect_kill().never();

        fixture.build().kill_job("job1", "user").await.unwrap();
    }

    #[tokio::test]
    async fn process_on_another_host() {
        let err = Fixture::new(Some(JobStatus::Running), false)
            .with_execution(execution("node-b", Some(42), None))
            .build()
            .kill_job("job1", "user")
            .await
            .unwrap_err();

        match err {
            JobError::InvalidKillTarget { host, current, .. } => {
                assert_eq!(host, "node-b");
                assert_eq!(current, HOST);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_pid() {
        let err = Fixture::new(Some(JobStatus::Running), false)
            .with_execution(execution(HOST, None, None))
            .build()
            .kill_job("job1", "user")
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::Precondition(_)));
    }

    #[tokio::test]
    async fn dead_process_is_not_killed() {
        let mut fixture = Fixture::new(Some(JobStatus::Running), false)
            .with_execution(execution(HOST, Some(42), None));
        fixture
            .checker
            .expect_check_process()
            .returning(|_| Ok(ProcessState::Dead));
        fixture.killer.expect_kill().never();

        fixture.build().kill_job("job1", "user").await.unwrap();
    }

    #[tokio::test]
    async fn live_process_is_killed_and_reason_recorded() {
        let mut fixture = Fixture::new(Some(JobStatus::Running), false)
            .with_execution(execution(HOST, Some(42), None));
        fixture
            .checker
            .expect_check_process()
            .withf(|pid| *pid == 42)
            .returning(|_| Ok(ProcessState::Alive));
        fixture
            .killer
            .expect_kill()
            .times(1)
            .withf(|pid, run_as_user| *pid == 42 && !*run_as_user)
            .returning(|_, _| Ok(()));
        let jobs_dir = fixture.jobs_dir.clone();

        fixture
            .build()
            .kill_job("job1", "Killed by \"admin\"")
            .await
            .unwrap();

        let written =
            std::fs::read_to_string(jobs_dir.join("job1").join("conductor").join("kill-reason"))
                .unwrap();
        let json: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(json["killReason"], "Killed by \"admin\"");
        std::fs::remove_dir_all(jobs_dir).unwrap();
    }

    #[tokio::test]
    async fn reason_goes_to_requested_job_directory() {
        let requested = std::env::temp_dir().join(uuid::Uuid::new_v4().to_string());
        let workdir = requested.join("job1");
        let mut fixture = Fixture::new(Some(JobStatus::Running), false).with_execution(
            JobExecution {
                working_directory: Some(workdir.clone()),
                ..execution(HOST, Some(42), None)
            },
        );
        fixture
            .checker
            .expect_check_process()
            .returning(|_| Ok(ProcessState::Alive));
        fixture.killer.expect_kill().times(1).returning(|_, _| Ok(()));
        let jobs_dir = fixture.jobs_dir.clone();

        fixture.build().kill_job("job1", "timeout").await.unwrap();

        let written =
            std::fs::read_to_string(workdir.join("conductor").join("kill-reason")).unwrap();
        assert!(written.contains("timeout"));
        assert!(!jobs_dir.exists());
        std::fs::remove_dir_all(requested).unwrap();
    }
}
