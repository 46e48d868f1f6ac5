use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::CriteriaConflict;
use crate::model::entity::ResourceMetadata;

/// Constraints on catalog resources. Unset scalar fields match anything, tags must all be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct Criterion {
    #[builder(default, setter(into, strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[builder(default, setter(into, strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[builder(default, setter(into, strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[builder(default, setter(into, strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[builder(default, setter(into))]
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Criterion {
    /// Combines two criteria into one that only matches what both match.
    pub fn merge(&self, other: &Criterion) -> Result<Criterion, CriteriaConflict> {
        Ok(Criterion {
            id: merge_field(&self.id, &other.id, "id")?,
            name: merge_field(&self.name, &other.name, "name")?,
            version: merge_field(&self.version, &other.version, "version")?,
            status: merge_field(&self.status, &other.status, "status")?,
            tags: self.tags.union(&other.tags).cloned().collect(),
        })
    }

    pub fn matches(&self, id: &str, metadata: &ResourceMetadata) -> bool {
        field_matches(&self.id, id)
            && field_matches(&self.name, &metadata.name)
            && field_matches(&self.version, &metadata.version)
            && field_matches(&self.status, &metadata.status)
            && self.tags.is_subset(&metadata.tags)
    }
}

fn merge_field(
    one: &Option<String>,
    two: &Option<String>,
    field: &'static str,
) -> Result<Option<String>, CriteriaConflict> {
    match (one, two) {
        (Some(one), Some(two)) if one != two => Err(CriteriaConflict { field }),
        (Some(one), _) => Ok(Some(one.clone())),
        (None, two) => Ok(two.clone()),
    }
}

fn field_matches(expected: &Option<String>, actual: &str) -> bool {
    expected.as_deref().map_or(true, |expected| expected == actual)
}
