//! Typed aggregation plan
//!
//! A [`QueryPlan`] is an ordered list of stages built once per request. The
//! MongoDB adapter compiles it with [`QueryPlan::to_pipeline`]; the
//! in-process store evaluates the same stages directly.

use mongodb::bson::{doc, Bson, Document as BsonDocument};

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::FilterOrderInfo;

/// Keeps both denominators away from zero
pub const AVAILABILITY_EPSILON: f64 = 1.00000001;

pub const AVG_UP: &str = "avgup";
pub const AVG_UNKNOWN: &str = "avgu";
pub const AVG_DOWN: &str = "avgd";
pub const AVAILABILITY: &str = "a";
pub const RELIABILITY: &str = "r";

pub fn availability(avg_up: f64, avg_unknown: f64) -> f64 {
    avg_up / (AVAILABILITY_EPSILON - avg_unknown) * 100.0
}

pub fn reliability(avg_up: f64, avg_unknown: f64, avg_down: f64) -> f64 {
    avg_up / ((AVAILABILITY_EPSILON - avg_unknown) - avg_down) * 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct Average {
    pub output: String,
    pub input: String,
}

impl Average {
    pub fn new(output: impl Into<String>, input: impl Into<String>) -> Self {
        Self { output: output.into(), input: input.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Keep `keep` and cut `field` down to its first `len` characters
    TruncateDate {
        field: String,
        len: usize,
        keep: Vec<String>,
    },
    /// Lift group keys out of `_id` and derive availability/reliability
    /// from the averaged fractions
    Availability {
        date_field: String,
        keys: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(FilterWhere),
    Project(Projection),
    /// Group on the truncated date plus `keys`, averaging each input
    GroupAndAverage {
        date_field: String,
        date_len: usize,
        keys: Vec<String>,
        averages: Vec<Average>,
    },
    Sort(Vec<FilterOrderInfo>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPlan {
    stages: Vec<Stage>,
}

impl QueryPlan {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn to_pipeline(&self) -> Result<Vec<BsonDocument>, FilterError> {
        self.stages.iter().map(Stage::to_document).collect()
    }
}

fn field_ref(field: &str) -> String {
    format!("${}", field)
}

fn substr(field: &str, len: usize) -> Bson {
    Bson::Document(doc! {
        "$substr": [field_ref(field), 0_i32, len as i32]
    })
}

impl Stage {
    pub fn to_document(&self) -> Result<BsonDocument, FilterError> {
        let stage = match self {
            Stage::Match(filter) => {
                let conditions = filter.to_document()?;
                doc! { "$match": conditions }
            }
            Stage::Project(Projection::TruncateDate { field, len, keep }) => {
                let mut projection = BsonDocument::new();
                projection.insert(field.clone(), substr(field, *len));
                for key in keep {
                    projection.insert(key.clone(), 1_i32);
                }
                doc! { "$project": projection }
            }
            Stage::Project(Projection::Availability { date_field, keys }) => {
                let mut projection = BsonDocument::new();
                projection.insert(date_field.clone(), format!("$_id.{}", date_field));
                for key in keys {
                    projection.insert(key.clone(), format!("$_id.{}", key));
                }
                for avg in [AVG_UP, AVG_UNKNOWN, AVG_DOWN] {
                    projection.insert(avg, 1_i32);
                }

                let unknown_gap = Bson::Document(doc! {
                    "$subtract": [AVAILABILITY_EPSILON, field_ref(AVG_UNKNOWN)]
                });
                let down_gap = Bson::Document(doc! {
                    "$subtract": [unknown_gap.clone(), field_ref(AVG_DOWN)]
                });
                let availability = Bson::Document(doc! {
                    "$divide": [field_ref(AVG_UP), unknown_gap]
                });
                let reliability = Bson::Document(doc! {
                    "$divide": [field_ref(AVG_UP), down_gap]
                });
                projection.insert(AVAILABILITY, doc! { "$multiply": [availability, 100_i32] });
                projection.insert(RELIABILITY, doc! { "$multiply": [reliability, 100_i32] });
                doc! { "$project": projection }
            }
            Stage::GroupAndAverage { date_field, date_len, keys, averages } => {
                let mut id = BsonDocument::new();
                id.insert(date_field.clone(), substr(date_field, *date_len));
                for key in keys {
                    id.insert(key.clone(), field_ref(key));
                }
                let mut group = doc! { "_id": id };
                for avg in averages {
                    group.insert(avg.output.clone(), doc! { "$avg": field_ref(&avg.input) });
                }
                doc! { "$group": group }
            }
            Stage::Sort(orders) => doc! { "$sort": FilterOrder::generate(orders) },
        };
        Ok(stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formula_matches_reference_values() {
        let a = availability(0.9, 0.05);
        let r = reliability(0.9, 0.05, 0.02);
        assert!((a - 0.9 / (1.00000001 - 0.05) * 100.0).abs() < 1e-9);
        assert!((r - 0.9 / ((1.00000001 - 0.05) - 0.02) * 100.0).abs() < 1e-9);
        assert!((a - 94.7368).abs() < 1e-3);
        assert!((r - 96.7741).abs() < 1e-3);
    }

    #[test]
    fn denominators_never_hit_zero() {
        assert!(availability(0.0, 1.0).is_finite());
        assert!(reliability(0.0, 0.5, 0.5).is_finite());
    }

    #[test]
    fn truncate_projection_compiles_to_substr() {
        let stage = Stage::Project(Projection::TruncateDate {
            field: "dt".into(),
            len: 8,
            keep: vec!["ap".into(), "a".into()],
        });
        assert_eq!(
            stage.to_document().unwrap(),
            doc! { "$project": { "dt": { "$substr": ["$dt", 0, 8] }, "ap": 1, "a": 1 } }
        );
    }

    #[test]
    fn group_stage_averages_fractions() {
        let stage = Stage::GroupAndAverage {
            date_field: "dt".into(),
            date_len: 6,
            keys: vec!["n".into()],
            averages: vec![Average::new(AVG_UP, "up")],
        };
        assert_eq!(
            stage.to_document().unwrap(),
            doc! { "$group": { "_id": { "dt": { "$substr": ["$dt", 0, 6] }, "n": "$n" }, "avgup": { "$avg": "$up" } } }
        );
    }
}
