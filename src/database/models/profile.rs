use serde::{Deserialize, Serialize};

/// Availability profile: `groups` is an AND of ORs of service flavors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityProfile {
    pub id: String,
    pub name: String,
    pub namespace: String,
    pub groups: Vec<Vec<String>>,
    pub poems: Vec<String>,
}
