use domain::{
    model::{
        entity::{Cluster, Command, JobRequest},
        vo::{ClusterSelectionContext, CommandSelectionContext, SelectionResult},
    },
    service::{ClusterLoadBalancer, ClusterSelector, CommandSelector},
};
use rand::seq::SliceRandom;

const RANDOM_RATIONALE: &str = "Selected randomly";

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomClusterSelector;

impl ClusterSelector for RandomClusterSelector {
    fn name(&self) -> &'static str {
        "RandomClusterSelector"
    }

    fn select(
        &self,
        clusters: &[Cluster],
        _context: &ClusterSelectionContext,
    ) -> anyhow::Result<SelectionResult<Cluster>> {
        Ok(pick_random(clusters))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCommandSelector;

impl CommandSelector for RandomCommandSelector {
    fn name(&self) -> &'static str {
        "RandomCommandSelector"
    }

    fn select(
        &self,
        commands: &[Command],
        _context: &CommandSelectionContext,
    ) -> anyhow::Result<SelectionResult<Command>> {
        Ok(pick_random(commands))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomClusterLoadBalancer;

impl ClusterLoadBalancer for RandomClusterLoadBalancer {
    fn name(&self) -> &'static str {
        "RandomClusterLoadBalancer"
    }

    fn select_cluster(
        &self,
        clusters: &[Cluster],
        _request: &JobRequest,
    ) -> anyhow::Result<Option<Cluster>> {
        Ok(clusters.choose(&mut rand::thread_rng()).cloned())
    }
}

fn pick_random<T: Clone>(resources: &[T]) -> SelectionResult<T> {
    match resources.choose(&mut rand::thread_rng()) {
        Some(resource) => SelectionResult::Selected {
            resource: resource.clone(),
            rationale: Some(RANDOM_RATIONALE.to_owned()),
        },
        None => SelectionResult::NoPreference {
            rationale: Some("No resources to choose from".to_owned()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_pick_stays_within_candidates() {
        let candidates = vec![1, 2, 3];
        for _ in 0..20 {
            match pick_random(&candidates) {
                SelectionResult::Selected { resource, .. } => {
                    assert!(candidates.contains(&resource))
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn empty_candidates_have_no_preference() {
        let empty: Vec<u8> = Vec::new();
        assert!(matches!(
            pick_random(&empty),
            SelectionResult::NoPreference { .. }
        ));
    }
}
