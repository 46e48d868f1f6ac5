use std::collections::{BTreeMap, BTreeSet};

use domain::model::entity::{Cluster, Command, JobRequest, ResourceMetadata};

const PREFIX: &str = "CONDUCTOR_";
const ENVIRONMENT_VERSION: &str = "4";
const ID_TAG_PREFIX: &str = "conductor.id:";
const NAME_TAG_PREFIX: &str = "conductor.name:";

/// Everything the job environment block is derived from.
pub(super) struct EnvironmentInput<'a> {
    pub job_id: &'a str,
    pub request: &'a JobRequest,
    pub cluster: &'a Cluster,
    pub command: &'a Command,
    pub memory: u32,
}

pub(super) fn environment_variables(input: &EnvironmentInput<'_>) -> BTreeMap<String, String> {
    let EnvironmentInput {
        job_id,
        request,
        cluster,
        command,
        memory,
    } = input;
    let metadata = &request.metadata;
    let criteria = &request.criteria;

    let mut env = BTreeMap::new();
    let mut set = |key: &str, value: String| {
        env.insert(format!("{PREFIX}{key}"), value);
    };

    set("VERSION", ENVIRONMENT_VERSION.to_owned());
    set("CLUSTER_ID", cluster.id.clone());
    set("CLUSTER_NAME", cluster.metadata.name.clone());
    set("CLUSTER_TAGS", resource_tags(&cluster.id, &cluster.metadata));
    set("COMMAND_ID", command.id.clone());
    set("COMMAND_NAME", command.metadata.name.clone());
    set("COMMAND_TAGS", resource_tags(&command.id, &command.metadata));
    set("JOB_ID", job_id.to_string());
    set("JOB_NAME", metadata.name.clone());
    set("JOB_MEMORY", memory.to_string());
    set("JOB_TAGS", tags_to_string(&metadata.tags));
    set("JOB_GROUPING", metadata.grouping.clone().unwrap_or_default());
    set(
        "JOB_GROUPING_INSTANCE",
        metadata.grouping_instance.clone().unwrap_or_default(),
    );
    set(
        "REQUESTED_COMMAND_TAGS",
        tags_to_string(&criteria.command_criterion.tags),
    );

    let mut requested_cluster_tags = Vec::with_capacity(criteria.cluster_criteria.len());
    for (i, criterion) in criteria.cluster_criteria.iter().enumerate() {
        let tags = tags_to_string(&criterion.tags);
        requested_cluster_tags.push(format!("[{tags}]"));
        set(&format!("REQUESTED_CLUSTER_TAGS_{i}"), tags);
    }
    set(
        "REQUESTED_CLUSTER_TAGS",
        format!("[{}]", requested_cluster_tags.join(",")),
    );

    set("USER", metadata.user.clone());
    set("USER_GROUP", metadata.group.clone().unwrap_or_default());

    env
}

fn resource_tags(id: &str, metadata: &ResourceMetadata) -> String {
    let mut tags = metadata.tags.clone();
    tags.insert(format!("{ID_TAG_PREFIX}{id}"));
    tags.insert(format!("{NAME_TAG_PREFIX}{}", metadata.name));
    tags_to_string(&tags)
}

/// Sorted, comma joined and with quotes escaped so the value can be embedded in a shell string.
pub(super) fn tags_to_string(tags: &BTreeSet<String>) -> String {
    tags.iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
        .replace('\'', "\\'")
        .replace('"', "\\\"")
}
