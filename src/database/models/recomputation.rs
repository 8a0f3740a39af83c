use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recomputation {
    pub id: String,
    pub requester_name: String,
    pub requester_email: String,
    pub reason: String,
    pub start_time: String,
    pub end_time: String,
    pub report: String,
    pub exclude: Vec<String>,
    pub status: String,
    pub timestamp: String,
}
