mod container;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use domain::service::{ClusterLoadBalancer, ClusterSelector, CommandSelector};
use infrastructure::{
    process::{UnixProcessChecker, UnixProcessKiller},
    task::TokioTaskScheduler,
};
use service::prelude::*;

use crate::{
    config::NodeConfig,
    infrastructure::{
        database::JsonDb,
        service::{FlumeEventBus, LocalJobLauncher},
    },
};

pub use self::container::Container;

impl Container {
    pub async fn new(config: &NodeConfig) -> anyhow::Result<Self> {
        let db = Arc::new(
            JsonDb::new(&config.catalog_path, &config.save_path)
                .await
                .context("Failed to load job database")?,
        );
        let (event_bus, events) = FlumeEventBus::new();
        let event_bus = Arc::new(event_bus);

        let state = Arc::new(
            JobStateServiceImpl::builder()
                .scheduler(Arc::new(TokioTaskScheduler::new()?))
                .publisher(event_bus.clone())
                .build(),
        );

        let resolver = JobResolverServiceImpl::builder()
            .persistence(db.clone())
            .catalog(db.clone())
            .cluster_selectors(vec![Arc::new(RandomClusterSelector) as Arc<dyn ClusterSelector>])
            .command_selectors(vec![Arc::new(RandomCommandSelector) as Arc<dyn CommandSelector>])
            .load_balancers(vec![
                Arc::new(RandomClusterLoadBalancer) as Arc<dyn ClusterLoadBalancer>
            ])
            .settings(
                ResolverSettings::builder()
                    .mode(config.resolution.mode)
                    .default_job_memory(config.jobs.memory.default_job_memory)
                    .default_timeout(config.jobs.default_timeout)
                    .jobs_dir(config.locations.jobs.clone())
                    .archives_dir(config.locations.archives.clone())
                    .build(),
            )
            .build();

        let kill = JobKillServiceImpl::builder()
            .persistence(db.clone())
            .search(db.clone())
            .publisher(event_bus.clone())
            .process_checker(Arc::new(
                UnixProcessChecker::builder()
                    .timeout(Duration::from_secs(config.process.check_timeout))
                    .run_as_user(config.jobs.run_as_user)
                    .build(),
            ))
            .process_killer(Arc::new(UnixProcessKiller))
            .agent_killer(db.clone())
            .settings(
                KillSettings::builder()
                    .hostname(config.hostname.clone())
                    .jobs_dir(config.locations.jobs.clone())
                    .run_as_user(config.jobs.run_as_user)
                    .build(),
            )
            .build();

        let launcher = LocalJobLauncher::builder()
            .persistence(db.clone())
            .publisher(event_bus)
            .hostname(config.hostname.clone())
            .build();

        let settings = CoordinatorSettings {
            max_job_memory: config.jobs.memory.max_job_memory,
            max_system_memory: config.jobs.memory.max_system_memory,
            user_limit: config.user_limit(),
        };

        let coordinator = JobCoordinatorServiceImpl::builder()
            .persistence(db.clone())
            .resolver(Arc::new(resolver))
            .state(state.clone())
            .search(db.clone())
            .kill(Arc::new(kill))
            .launcher(Arc::new(launcher))
            .settings(settings)
            .build();

        let container = Container::builder()
            .coordinator(Arc::new(coordinator))
            .state(state)
            .persistence(db)
            .events(events)
            .build();

        Ok(container)
    }
}
