use thiserror::Error;

use crate::model::entity::JobStatus;

/// Two criteria carried different values for the same scalar field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}'s were both present but not equal")]
pub struct CriteriaConflict {
    pub field: &'static str,
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("No command matching command criterion found")]
    NoCommandFound,
    #[error("Expected a command but no command selector chose one. Rationale: {rationale}")]
    NoCommandSelected { rationale: String },
    #[error("No cluster/command combination found for the given criteria")]
    NoClusterFound,
    #[error("No cluster selector chose a cluster from the candidates. Rationale: {rationale}")]
    NoClusterSelected { rationale: String },
    #[error("No application with id {0} exists")]
    ApplicationNotFound(String),
    #[error("No job with id {0} exists")]
    JobNotFound(String),
    #[error("Job {id} is in status {status} and can't be resolved")]
    NotResolvable { id: String, status: JobStatus },
    #[error("Job resolution failed: {0:#}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error("Requested {requested} MB to run job which is more than the {max} MB allowed")]
    ResourceLimitExceeded { requested: u32, max: u32 },
    #[error("User {user} exceeded active jobs limit ({active}/{limit})")]
    UserLimitExceeded { user: String, active: u64, limit: u64 },
    #[error(
        "Job {job_id} can't run on this node: {used}/{max} MB are used and {requested} MB were requested"
    )]
    NodeCapacityUnavailable {
        job_id: String,
        used: u32,
        max: u32,
        requested: u32,
    },
    #[error("No job with id {0} exists")]
    JobNotFound(String),
    #[error("Job {id} is not running on this host ({current}), it runs on {host}")]
    InvalidKillTarget {
        id: String,
        host: String,
        current: String,
    },
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Precondition(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl JobError {
    /// Status a job is moved to when its coordination fails with this error.
    pub fn failure_status(&self) -> JobStatus {
        match self {
            Self::ResourceLimitExceeded { .. } => JobStatus::Invalid,
            _ => JobStatus::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_resource_limit_is_invalid() {
        let limit = JobError::ResourceLimitExceeded {
            requested: 2048,
            max: 1024,
        };
        assert_eq!(limit.failure_status(), JobStatus::Invalid);
        assert_eq!(
            JobError::Resolution(ResolutionError::NoClusterFound).failure_status(),
            JobStatus::Failed
        );
        assert_eq!(
            JobError::NodeCapacityUnavailable {
                job_id: "j".to_owned(),
                used: 1,
                max: 1,
                requested: 1,
            }
            .failure_status(),
            JobStatus::Failed
        );
    }

    #[test]
    fn conflict_names_field() {
        let e = CriteriaConflict { field: "name" };
        assert_eq!(e.to_string(), "name's were both present but not equal");
    }

    #[test]
    fn internal_keeps_cause() {
        let e = ResolutionError::from(anyhow::anyhow!("catalog offline").context("find commands"));
        assert_eq!(e.to_string(), "Job resolution failed: find commands: catalog offline");
    }
}
