use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use domain::{
    model::{
        entity::{ExecutionMode, JobExecution, JobStatus, ResolvedJob},
        vo::{JobEvent, JobFinishedReason},
    },
    service::{JobEventPublisher, JobLauncher, JobPersistenceService},
};
use tokio::process::Command;
use typed_builder::TypedBuilder;

/// Runs resolved jobs as child processes of this node.
#[derive(TypedBuilder)]
pub struct LocalJobLauncher {
    persistence: Arc<dyn JobPersistenceService>,
    publisher: Arc<dyn JobEventPublisher>,
    #[builder(setter(into))]
    hostname: String,
}

#[async_trait::async_trait]
impl JobLauncher for LocalJobLauncher {
    async fn launch(&self, job: &ResolvedJob) -> anyhow::Result<()> {
        let id = job.job_id();
        let (reason, message) = match self.run(job).await {
            Ok(status) => finished_reason(status),
            Err(e) => {
                self.publisher.publish(JobEvent::Finished {
                    job_id: id.to_owned(),
                    reason: JobFinishedReason::Failed,
                    message: format!("{e:#}"),
                });
                return Err(e);
            }
        };
        tracing::info!(job_id = %id, "Job finished: {message}");
        self.publisher.publish(JobEvent::Finished {
            job_id: id.to_owned(),
            reason,
            message,
        });
        Ok(())
    }
}

impl LocalJobLauncher {
    async fn run(&self, job: &ResolvedJob) -> anyhow::Result<ExitStatus> {
        let id = job.job_id();
        let spec = &job.specification;
        let workdir = spec.job_directory.join(id);
        tokio::fs::create_dir_all(&workdir)
            .await
            .with_context(|| format!("Failed to create job directory {}", workdir.display()))?;

        let mut command_line = spec.command_line();
        let program = command_line
            .next()
            .with_context(|| format!("Job {id} has an empty command line"))?;
        let mut child = Command::new(program)
            .args(command_line)
            .envs(&job.environment.environment_variables)
            .current_dir(&workdir)
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn `{program}`"))?;
        let pid = child.id();

        // A running job must always have its execution on record for kills to find it.
        let mut execution = JobExecution {
            host_name: self.hostname.clone(),
            process_id: pid,
            exit_code: None,
            mode: ExecutionMode::Embedded,
            working_directory: Some(workdir),
        };
        self.persistence
            .update_job_execution(id, execution.clone())
            .await?;
        self.persistence
            .update_job_status(id, JobStatus::Resolved, JobStatus::Running, "Job is running")
            .await?;
        tracing::info!(job_id = %id, pid = ?pid, "Job started");

        let status = match spec.timeout {
            Some(secs) => {
                match tokio::time::timeout(Duration::from_secs(secs.into()), child.wait()).await {
                    Ok(status) => status?,
                    Err(_) => {
                        child.kill().await?;
                        anyhow::bail!("Job timed out after {secs}s");
                    }
                }
            }
            None => child.wait().await?,
        };

        execution.exit_code = status.code();
        self.persistence.update_job_execution(id, execution).await?;
        Ok(status)
    }
}

fn finished_reason(status: ExitStatus) -> (JobFinishedReason, String) {
    if let Some(signal) = status.signal() {
        return (
            JobFinishedReason::Killed,
            format!("Job was killed by signal {signal}"),
        );
    }
    match status.code() {
        Some(0) => (JobFinishedReason::Succeeded, "Job finished successfully".to_owned()),
        Some(code) => (
            JobFinishedReason::Failed,
            format!("Job failed with exit code {code}"),
        ),
        None => (JobFinishedReason::Failed, "Job exited without a code".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use domain::{
        model::entity::{
            ExecutionResource, ExecutionResourceCriteria, JobEnvironment, JobMetadata, JobRequest,
            JobSpecification,
        },
        model::vo::Criterion,
        service::{JobSearchService, MockJobPersistenceService},
    };

    use super::*;
    use crate::infrastructure::{
        database::{Catalog, JsonDb},
        service::FlumeEventBus,
    };

    fn resolved(id: &str, dir: &std::path::Path, script: &str) -> ResolvedJob {
        let resource = |id: &str| ExecutionResource {
            id: id.to_owned(),
            environment: Default::default(),
        };
        ResolvedJob {
            specification: JobSpecification {
                executable: vec!["sh".to_owned(), "-c".to_owned()],
                arguments: vec![script.to_owned()],
                job: resource(id),
                cluster: resource("c1"),
                command: resource("sh"),
                applications: vec![],
                environment_variables: BTreeMap::new(),
                interactive: false,
                job_directory: dir.to_path_buf(),
                archive_location: None,
                timeout: None,
            },
            environment: JobEnvironment {
                memory: 128,
                environment_variables: BTreeMap::from([(
                    "GREETING".to_owned(),
                    "hello".to_owned(),
                )]),
            },
            metadata: JobMetadata::builder().name("q").user("alice").version("1").build(),
        }
    }

    async fn setup(
        id: &str,
    ) -> (
        LocalJobLauncher,
        Arc<JsonDb>,
        flume::Receiver<JobEvent>,
        std::path::PathBuf,
    ) {
        let dir = std::env::temp_dir().join(format!("conductor-launch-{}", uuid::Uuid::new_v4()));
        let db = Arc::new(JsonDb::with_jobs(Catalog::default(), HashMap::new(), dir.join("db")));
        let request = JobRequest::builder()
            .metadata(JobMetadata::builder().name("q").user("alice").version("1").build())
            .criteria(
                ExecutionResourceCriteria::builder()
                    .command_criterion(Criterion::default())
                    .build(),
            )
            .build();
        db.save_job_request(id, &request).await.unwrap();
        db.update_job_status(id, JobStatus::Init, JobStatus::Resolved, "resolved")
            .await
            .unwrap();
        let (bus, events) = FlumeEventBus::new();
        let launcher = LocalJobLauncher::builder()
            .persistence(db.clone())
            .publisher(Arc::new(bus))
            .hostname("node-1")
            .build();
        (launcher, db, events, dir)
    }

    #[tokio::test]
    async fn runs_job_in_its_directory() {
        let (launcher, db, events, dir) = setup("j1").await;
        let job = resolved("j1", &dir, "echo $GREETING > out.txt");

        launcher.launch(&job).await.unwrap();

        let out = std::fs::read_to_string(dir.join("j1").join("out.txt")).unwrap();
        assert_eq!(out.trim(), "hello");
        assert_eq!(db.get_job_status("j1").await.unwrap(), Some(JobStatus::Running));
        let execution = db.get_job_execution("j1").await.unwrap().unwrap();
        assert_eq!(execution.exit_code, Some(0));
        assert_eq!(execution.host_name, "node-1");
        assert_eq!(execution.working_directory, Some(dir.join("j1")));
        assert!(matches!(
            events.try_recv().unwrap(),
            JobEvent::Finished { reason: JobFinishedReason::Succeeded, .. }
        ));
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_failure() {
        let (launcher, _db, events, dir) = setup("j2").await;

        launcher.launch(&resolved("j2", &dir, "exit 3")).await.unwrap();

        match events.try_recv().unwrap() {
            JobEvent::Finished { reason, message, .. } => {
                assert_eq!(reason, JobFinishedReason::Failed);
                assert!(message.contains('3'));
            }
            e => panic!("unexpected event {e:?}"),
        }
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn timeout_kills_the_job() {
        let (launcher, _db, events, dir) = setup("j3").await;
        let mut job = resolved("j3", &dir, "sleep 30");
        job.specification.timeout = Some(1);

        launcher.launch(&job).await.unwrap_err();

        assert!(matches!(
            events.try_recv().unwrap(),
            JobEvent::Finished { reason: JobFinishedReason::Failed, .. }
        ));
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn execution_is_recorded_before_job_is_running() {
        let dir = std::env::temp_dir().join(format!("conductor-launch-{}", uuid::Uuid::new_v4()));
        let mut seq = mockall::Sequence::new();
        let mut persistence = MockJobPersistenceService::new();
        let workdir = dir.join("j4");
        persistence
            .expect_update_job_execution()
            .withf(move |id, execution| {
                id == "j4"
                    && execution.exit_code.is_none()
                    && execution.process_id.is_some()
                    && execution.working_directory.as_deref() == Some(workdir.as_path())
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        persistence
            .expect_update_job_status()
            .withf(|id, expected, status, _| {
                id == "j4" && *expected == JobStatus::Resolved && *status == JobStatus::Running
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _, _| Ok(()));
        persistence
            .expect_update_job_execution()
            .withf(|_, execution| execution.exit_code == Some(0))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        let (bus, _events) = FlumeEventBus::new();
        let launcher = LocalJobLauncher::builder()
            .persistence(Arc::new(persistence))
            .publisher(Arc::new(bus))
            .hostname("node-1")
            .build();

        launcher.launch(&resolved("j4", &dir, "exit 0")).await.unwrap();

        std::fs::remove_dir_all(dir).unwrap();
    }
}
