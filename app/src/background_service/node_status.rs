use std::sync::Arc;
use std::time::Duration;

use domain::service::JobStateService;
use infrastructure::sync::timer;
use tokio_util::sync::CancellationToken;

pub struct NodeStatusReporter {
    state: Arc<dyn JobStateService>,
    interval: Duration,
}

impl NodeStatusReporter {
    pub fn new(state: Arc<dyn JobStateService>, interval: Duration) -> Self {
        Self { state, interval }
    }

    pub async fn run(self, token: CancellationToken) {
        let this = &self;
        timer::run_every(self.interval, token, move || async move {
            this.report();
        })
        .await;
    }

    fn report(&self) {
        let used_memory = self.state.used_memory();
        let active_jobs = self.state.active_job_count();
        let cancel_failures = self.state.cancel_failures();
        tracing::info!(used_memory, active_jobs, cancel_failures, "Node status");
    }
}

#[cfg(test)]
mod tests {
    use domain::service::MockJobStateService;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn reports_until_cancelled() {
        let mut state = MockJobStateService::new();
        state.expect_used_memory().times(2).return_const(512u32);
        state.expect_active_job_count().times(2).return_const(1usize);
        state.expect_cancel_failures().times(2).return_const(0u64);
        let token = CancellationToken::new();
        let reporter = NodeStatusReporter::new(Arc::new(state), Duration::from_secs(30));
        let handle = tokio::spawn(reporter.run(token.clone()));

        tokio::time::sleep(Duration::from_secs(45)).await;
        token.cancel();

        handle.await.unwrap();
    }
}
