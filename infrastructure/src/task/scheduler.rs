use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use domain::service::{LaunchTask, ScheduledTask, TaskScheduler};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Runs launch tasks on the tokio runtime it was created in.
#[derive(Debug, Clone)]
pub struct TokioTaskScheduler {
    runtime: Handle,
}

impl TokioTaskScheduler {
    pub fn new() -> anyhow::Result<Self> {
        let runtime = Handle::try_current().context("Task scheduler needs a tokio runtime")?;
        Ok(Self { runtime })
    }
}

impl TaskScheduler for TokioTaskScheduler {
    fn schedule(&self, task: LaunchTask, start_at: DateTime<Utc>) -> Arc<dyn ScheduledTask> {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let delay = (start_at - Utc::now()).to_std().unwrap_or_default();

        let handle = self.runtime.spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => tracing::debug!("Launch task cancelled"),
                _ = async {
                    tokio::time::sleep(delay).await;
                    task.await
                } => (),
            }
        });

        Arc::new(TokioScheduledTask { token, handle })
    }
}

struct TokioScheduledTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl ScheduledTask for TokioScheduledTask {
    fn cancel(&self) -> bool {
        if self.handle.is_finished() {
            return false;
        }
        self.token.cancel();
        true
    }

    fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::*;

    fn flag_task(flag: &Arc<AtomicBool>) -> LaunchTask {
        let flag = Arc::clone(flag);
        Box::pin(async move { flag.store(true, Ordering::SeqCst) })
    }

    #[tokio::test]
    async fn runs_immediate_task() {
        let scheduler = TokioTaskScheduler::new().unwrap();
        let ran = Arc::new(AtomicBool::new(false));

        let task = scheduler.schedule(flag_task(&ran), Utc::now());
        for _ in 0..100 {
            if task.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(task.is_finished());
        assert!(ran.load(Ordering::SeqCst));
        assert!(!task.cancel());
    }

    #[tokio::test]
    async fn cancelled_task_never_runs() {
        let scheduler = TokioTaskScheduler::new().unwrap();
        let ran = Arc::new(AtomicBool::new(false));

        let task = scheduler.schedule(
            flag_task(&ran),
            Utc::now() + chrono::Duration::seconds(60),
        );
        assert!(task.cancel());
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(task.is_finished());
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[test]
    fn needs_runtime() {
        assert!(TokioTaskScheduler::new().is_err());
    }
}
