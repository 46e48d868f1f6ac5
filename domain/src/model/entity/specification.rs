use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::entity::JobMetadata;
use crate::model::vo::ExecutionEnvironment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResource {
    pub id: String,
    pub environment: ExecutionEnvironment,
}

/// Everything needed to launch a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpecification {
    pub executable: Vec<String>,
    pub arguments: Vec<String>,
    pub job: ExecutionResource,
    pub cluster: ExecutionResource,
    pub command: ExecutionResource,
    pub applications: Vec<ExecutionResource>,
    pub environment_variables: BTreeMap<String, String>,
    pub interactive: bool,
    pub job_directory: PathBuf,
    pub archive_location: Option<String>,
    /// In seconds.
    pub timeout: Option<u32>,
}

impl JobSpecification {
    pub fn command_line(&self) -> impl Iterator<Item = &str> {
        self.executable
            .iter()
            .chain(self.arguments.iter())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEnvironment {
    /// In MB.
    pub memory: u32,
    pub environment_variables: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedJob {
    pub specification: JobSpecification,
    pub environment: JobEnvironment,
    pub metadata: JobMetadata,
}

impl ResolvedJob {
    pub fn job_id(&self) -> &str {
        &self.specification.job.id
    }

    pub fn cluster_id(&self) -> &str {
        &self.specification.cluster.id
    }

    pub fn command_id(&self) -> &str {
        &self.specification.command.id
    }

    pub fn application_ids(&self) -> Vec<String> {
        self.specification
            .applications
            .iter()
            .map(|a| a.id.clone())
            .collect()
    }

    pub fn memory(&self) -> u32 {
        self.environment.memory
    }
}
