use serde::{Deserialize, Serialize};

use crate::model::entity::JobStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum JobEvent {
    #[serde(rename_all = "camelCase")]
    Scheduled { job_id: String, memory: u32 },
    #[serde(rename_all = "camelCase")]
    Finished {
        job_id: String,
        reason: JobFinishedReason,
        message: String,
    },
}

impl JobEvent {
    pub fn job_id(&self) -> &str {
        match self {
            Self::Scheduled { job_id, .. } | Self::Finished { job_id, .. } => job_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobFinishedReason {
    Succeeded,
    Failed,
    Killed,
}

impl JobFinishedReason {
    pub fn status(self) -> JobStatus {
        match self {
            Self::Succeeded => JobStatus::Succeeded,
            Self::Failed => JobStatus::Failed,
            Self::Killed => JobStatus::Killed,
        }
    }
}
