use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::model::vo::{Criterion, ExecutionEnvironment};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    #[builder(setter(into))]
    pub name: String,
    #[builder(setter(into))]
    pub user: String,
    #[builder(setter(into))]
    pub version: String,
    /// `UP`, `OUT_OF_SERVICE` or `TERMINATED` for clusters,
    /// `ACTIVE`, `DEPRECATED` or `INACTIVE` for commands and applications.
    #[builder(setter(into))]
    pub status: String,
    #[builder(default, setter(into))]
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[builder(default, setter(into, strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: String,
    pub metadata: ResourceMetadata,
    #[serde(default)]
    pub resources: ExecutionEnvironment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub id: String,
    pub metadata: ResourceMetadata,
    #[serde(default)]
    pub resources: ExecutionEnvironment,
    pub executable: Vec<String>,
    /// Memory hint in MB used when the request doesn't ask for any.
    #[serde(default)]
    pub memory: Option<u32>,
    /// Ordered by priority.
    #[serde(default)]
    pub cluster_criteria: Vec<Criterion>,
    #[serde(default)]
    pub application_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub metadata: ResourceMetadata,
    #[serde(default)]
    pub resources: ExecutionEnvironment,
}
