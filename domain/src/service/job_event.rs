use crate::model::vo::JobEvent;

#[cfg_attr(feature = "mockall", mockall::automock)]
pub trait JobEventPublisher: Send + Sync {
    fn publish(&self, event: JobEvent);
}
