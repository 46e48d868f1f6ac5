mod catalog;
mod job_coordinator;
mod job_event;
mod job_kill;
mod job_launcher;
mod job_persistence;
mod job_resolver;
mod job_search;
mod job_state;
mod process;
mod selector;
mod task_scheduler;

#[rustfmt::skip]
pub use self::{
    catalog::CatalogService,
    job_coordinator::JobCoordinatorService,
    job_event::JobEventPublisher,
    job_kill::JobKillService,
    job_launcher::JobLauncher,
    job_persistence::JobPersistenceService,
    job_resolver::JobResolverService,
    job_search::JobSearchService,
    job_state::JobStateService,
    process::{AgentJobKiller, ProcessChecker, ProcessKiller, ProcessState},
    selector::{ClusterLoadBalancer, ClusterSelector, CommandSelector},
    task_scheduler::{LaunchTask, ScheduledTask, TaskScheduler},
};

#[cfg(feature = "mockall")]
#[rustfmt::skip]
pub use self::{
    catalog::MockCatalogService,
    job_coordinator::MockJobCoordinatorService,
    job_event::MockJobEventPublisher,
    job_kill::MockJobKillService,
    job_launcher::MockJobLauncher,
    job_persistence::MockJobPersistenceService,
    job_resolver::MockJobResolverService,
    job_search::MockJobSearchService,
    job_state::MockJobStateService,
    process::{MockAgentJobKiller, MockProcessChecker, MockProcessKiller},
    selector::{MockClusterLoadBalancer, MockClusterSelector, MockCommandSelector},
    task_scheduler::{MockScheduledTask, MockTaskScheduler},
};
