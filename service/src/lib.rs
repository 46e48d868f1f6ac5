pub mod coordinator;
pub mod kill;
pub mod resolver;
pub mod selector;
pub mod state;

pub mod prelude {
    #[rustfmt::skip]
    pub use super::{
        coordinator::{CoordinatorSettings, JobCoordinatorServiceImpl},
        kill::{JobKillServiceImpl, KillSettings},
        resolver::{JobResolverServiceImpl, ResolutionMode, ResolverSettings},
        selector::{RandomClusterLoadBalancer, RandomClusterSelector, RandomCommandSelector},
        state::JobStateServiceImpl,
    };
}
