use domain::model::entity::JobRequest;
use serde::*;

/// Content of a `*.job.json` inbox file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSubmission {
    /// Generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub request: JobRequest,
}

impl JobSubmission {
    pub fn job_id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }
}

/// Content of a `*.kill.json` inbox file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillRequest {
    pub id: String,
    #[serde(default = "KillRequest::default_reason")]
    pub reason: String,
}

impl KillRequest {
    pub fn default_reason() -> String {
        "Killed by user request".to_owned()
    }
}
