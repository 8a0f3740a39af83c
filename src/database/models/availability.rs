//! Rows produced by the availability aggregation plans
//!
//! Field names follow the short keys stored in the `ar` databases.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accepts strings, numbers and null, so a date bucket or flag comes
/// back as text whatever the loader stored
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteAvailability {
    #[serde(rename = "dt", deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(rename = "ns", deserialize_with = "lenient_string")]
    pub namespace: String,
    #[serde(rename = "ap", deserialize_with = "lenient_string")]
    pub profile: String,
    #[serde(rename = "n", deserialize_with = "lenient_string")]
    pub ngi: String,
    #[serde(rename = "s", deserialize_with = "lenient_string")]
    pub site: String,
    #[serde(rename = "i", deserialize_with = "lenient_string")]
    pub infrastructure: String,
    #[serde(rename = "sc", deserialize_with = "lenient_string")]
    pub scope: String,
    #[serde(rename = "ss", deserialize_with = "lenient_string")]
    pub site_scope: String,
    #[serde(rename = "pr", deserialize_with = "lenient_string")]
    pub production: String,
    #[serde(rename = "m", deserialize_with = "lenient_string")]
    pub monitored: String,
    #[serde(rename = "cs", deserialize_with = "lenient_string")]
    pub certification: String,
    #[serde(rename = "a")]
    pub availability: Option<f64>,
    #[serde(rename = "r")]
    pub reliability: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NgiAvailability {
    #[serde(rename = "dt", deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(rename = "ns", deserialize_with = "lenient_string")]
    pub namespace: String,
    #[serde(rename = "ap", deserialize_with = "lenient_string")]
    pub profile: String,
    #[serde(rename = "n", deserialize_with = "lenient_string")]
    pub ngi: String,
    #[serde(rename = "a")]
    pub availability: Option<f64>,
    #[serde(rename = "r")]
    pub reliability: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VoAvailability {
    #[serde(rename = "dt", deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(rename = "ns", deserialize_with = "lenient_string")]
    pub namespace: String,
    #[serde(rename = "ap", deserialize_with = "lenient_string")]
    pub profile: String,
    #[serde(rename = "v", deserialize_with = "lenient_string")]
    pub vo: String,
    #[serde(rename = "a")]
    pub availability: Option<f64>,
    #[serde(rename = "r")]
    pub reliability: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceFlavorAvailability {
    #[serde(rename = "dt", deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(rename = "ns", deserialize_with = "lenient_string")]
    pub namespace: String,
    #[serde(rename = "ap", deserialize_with = "lenient_string")]
    pub profile: String,
    #[serde(rename = "s", deserialize_with = "lenient_string")]
    pub site: String,
    #[serde(rename = "sf", deserialize_with = "lenient_string")]
    pub flavor: String,
    #[serde(rename = "a")]
    pub availability: Option<f64>,
    #[serde(rename = "r")]
    pub reliability: Option<f64>,
}
