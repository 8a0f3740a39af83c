use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportInfo {
    pub name: String,
    pub description: String,
    pub created: String,
    pub updated: String,
}

/// Nested grouping of the report topology, e.g. NGI → SITES
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyGroup {
    #[serde(rename = "type")]
    pub group_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Box<TopologyGroup>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologySchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<TopologyGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportProfile {
    pub name: String,
    #[serde(rename = "type")]
    pub profile_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterTag {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    pub id: String,
    pub info: ReportInfo,
    pub topology_schema: TopologySchema,
    pub profiles: Vec<ReportProfile>,
    pub filter_tags: Vec<FilterTag>,
}
