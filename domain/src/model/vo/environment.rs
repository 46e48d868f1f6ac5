use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Files a resource contributes to the job working environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionEnvironment {
    #[serde(default)]
    pub configs: BTreeSet<String>,
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_file: Option<String>,
}
