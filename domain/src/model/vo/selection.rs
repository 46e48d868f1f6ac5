use std::sync::Arc;

use crate::model::entity::{Command, JobRequest};

/// Outcome of one selector in a selection chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionResult<T> {
    Selected {
        resource: T,
        rationale: Option<String>,
    },
    /// The selector has no opinion, the next one in the chain is asked.
    NoPreference { rationale: Option<String> },
    Rejected { reason: String },
}

impl<T> SelectionResult<T> {
    pub fn rationale(&self) -> Option<&str> {
        match self {
            Self::Selected { rationale, .. } | Self::NoPreference { rationale } => {
                rationale.as_deref()
            }
            Self::Rejected { reason } => Some(reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClusterSelectionContext {
    pub job_id: String,
    pub job_request: Arc<JobRequest>,
    /// Command the clusters were found for.
    pub command: Option<Command>,
}

#[derive(Debug, Clone)]
pub struct CommandSelectionContext {
    pub job_id: String,
    pub job_request: Arc<JobRequest>,
}
