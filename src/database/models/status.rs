use serde::{Deserialize, Serialize};

use super::availability::lenient_string;

/// One status change of a site, as stored in `status_sites`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatusSite {
    #[serde(rename = "ts", deserialize_with = "lenient_string")]
    pub timestamp: String,
    #[serde(rename = "roc", deserialize_with = "lenient_string")]
    pub ngi: String,
    #[serde(deserialize_with = "lenient_string")]
    pub site: String,
    #[serde(rename = "s", deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(rename = "ti")]
    pub time_int: i64,
    #[serde(rename = "ps", deserialize_with = "lenient_string")]
    pub previous_status: String,
    #[serde(rename = "p", deserialize_with = "lenient_string")]
    pub profile: String,
}

/// Detailed probe output stored in `status_metrics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricResult {
    #[serde(deserialize_with = "lenient_string")]
    pub host: String,
    #[serde(deserialize_with = "lenient_string")]
    pub service: String,
    #[serde(deserialize_with = "lenient_string")]
    pub metric: String,
    #[serde(deserialize_with = "lenient_string")]
    pub timestamp: String,
    #[serde(deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(deserialize_with = "lenient_string")]
    pub message: String,
}
