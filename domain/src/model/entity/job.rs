use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use typed_builder::TypedBuilder;

use crate::model::vo::{Criterion, ExecutionEnvironment};

/// A job as submitted by a client. Never changes after submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub metadata: JobMetadata,
    pub criteria: ExecutionResourceCriteria,
    #[builder(default)]
    #[serde(default)]
    pub resources: ExecutionEnvironment,
    #[builder(default)]
    #[serde(default)]
    pub command_args: Vec<String>,
    /// In MB.
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub requested_memory: Option<u32>,
    #[builder(default)]
    #[serde(default)]
    pub agent_config: AgentConfigRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct JobMetadata {
    #[builder(setter(into))]
    pub name: String,
    #[builder(setter(into))]
    pub user: String,
    #[builder(setter(into))]
    pub version: String,
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub description: Option<String>,
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub group: Option<String>,
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub email: Option<String>,
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub grouping: Option<String>,
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub grouping_instance: Option<String>,
    #[builder(default, setter(into))]
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResourceCriteria {
    /// Ordered by priority.
    #[builder(default)]
    pub cluster_criteria: Vec<Criterion>,
    pub command_criterion: Criterion,
    /// Empty means the command's default applications.
    #[builder(default)]
    #[serde(default)]
    pub application_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfigRequest {
    #[serde(default)]
    pub interactive: bool,
    #[serde(default)]
    pub requested_job_directory: Option<PathBuf>,
    #[serde(default)]
    pub archiving_disabled: bool,
    /// In seconds.
    #[serde(default)]
    pub timeout: Option<u32>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Init,
    Resolved,
    Running,
    Succeeded,
    Killed,
    Failed,
    Invalid,
}

impl JobStatus {
    pub fn is_resolvable(self) -> bool {
        matches!(self, Self::Init)
    }

    pub fn is_active(self) -> bool {
        matches!(self, Self::Init | Self::Resolved | Self::Running)
    }

    pub fn is_finished(self) -> bool {
        !self.is_active()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Launched in process on the coordinating node.
    Embedded,
    /// Launched and supervised by a remote agent.
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExecution {
    pub host_name: String,
    #[serde(default)]
    pub process_id: Option<u32>,
    #[serde(default)]
    pub exit_code: Option<i32>,
    pub mode: ExecutionMode,
    /// Directory the process runs in.
    #[serde(default)]
    pub working_directory: Option<PathBuf>,
}
