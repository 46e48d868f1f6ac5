use crate::error::JobError;
use crate::service::LaunchTask;

/// Node local registry of the jobs this node owns.
#[cfg_attr(feature = "mockall", mockall::automock)]
pub trait JobStateService: Send + Sync {
    fn init(&self, id: &str);
    /// Reserves `memory` for the job and starts its launch task.
    fn schedule(&self, id: &str, memory: u32, task: LaunchTask) -> Result<(), JobError>;
    /// Forgets the job, cancelling its launch task if it is still pending. No-op for unknown ids.
    fn done(&self, id: &str);
    fn job_exists(&self, id: &str) -> bool;
    /// Sum of the memory reserved by scheduled jobs, in MB.
    fn used_memory(&self) -> u32;
    fn active_job_count(&self) -> usize;
    fn cancel_failures(&self) -> u64;
}
