use std::sync::Arc;

use domain::{
    model::vo::JobEvent,
    service::{JobCoordinatorService, JobPersistenceService, JobStateService},
};
use typed_builder::TypedBuilder;

#[derive(TypedBuilder)]
pub struct Container {
    pub coordinator: Arc<dyn JobCoordinatorService>,

    pub state: Arc<dyn JobStateService>,

    pub persistence: Arc<dyn JobPersistenceService>,

    /// Consumed once by the job event dispatcher.
    pub events: flume::Receiver<JobEvent>,
}
