use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;

pub type LaunchTask = BoxFuture<'static, ()>;

#[cfg_attr(feature = "mockall", mockall::automock)]
pub trait TaskScheduler: Send + Sync {
    fn schedule(&self, task: LaunchTask, start_at: DateTime<Utc>) -> Arc<dyn ScheduledTask>;
}

#[cfg_attr(feature = "mockall", mockall::automock)]
pub trait ScheduledTask: Send + Sync {
    /// Returns `false` when the task could not be cancelled.
    fn cancel(&self) -> bool;
    fn is_finished(&self) -> bool;
}
