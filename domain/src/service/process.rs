#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Alive,
    Dead,
}

#[cfg_attr(feature = "mockall", mockall::automock)]
#[async_trait::async_trait]
pub trait ProcessChecker: Send + Sync {
    async fn check_process(&self, pid: u32) -> anyhow::Result<ProcessState>;
}

#[cfg_attr(feature = "mockall", mockall::automock)]
#[async_trait::async_trait]
pub trait ProcessKiller: Send + Sync {
    async fn kill(&self, pid: u32, run_as_user: bool) -> anyhow::Result<()>;
}

/// Signals the agent supervising a job that it has to be killed.
#[cfg_attr(feature = "mockall", mockall::automock)]
#[async_trait::async_trait]
pub trait AgentJobKiller: Send + Sync {
    async fn kill(&self, id: &str, reason: &str) -> anyhow::Result<()>;
}
