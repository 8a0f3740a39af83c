use mongodb::bson::{doc, Bson, Document as BsonDocument};
use serde_json::{Map, Value};

use super::error::FilterError;
use super::types::{compare_values, same_type, values_equal, FilterOp, FilterWhereInfo};

/// Conjunction of field conditions, the body of a `$match` stage or a
/// CRUD lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterWhere {
    conditions: Vec<FilterWhereInfo>,
}

impl FilterWhere {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, data: impl Into<Value>) -> Self {
        self.conditions.push(FilterWhereInfo {
            column: column.into(),
            operator: FilterOp::Eq,
            data: data.into(),
        });
        self
    }

    /// `$in` over `values`; an empty list adds no condition at all
    pub fn is_in<I, V>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return self;
        }
        self.conditions.push(FilterWhereInfo {
            column: column.into(),
            operator: FilterOp::In,
            data: Value::Array(values),
        });
        self
    }

    /// Inclusive range `[low, high]`
    pub fn between(mut self, column: impl Into<String>, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.conditions.push(FilterWhereInfo {
            column: column.into(),
            operator: FilterOp::Between,
            data: Value::Array(vec![low.into(), high.into()]),
        });
        self
    }

    pub fn conditions(&self) -> &[FilterWhereInfo] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Compile into a MongoDB query document
    pub fn to_document(&self) -> Result<BsonDocument, FilterError> {
        let mut document = BsonDocument::new();
        for condition in &self.conditions {
            let clause = match condition.operator {
                FilterOp::Eq => to_bson(&condition.data)?,
                FilterOp::In => {
                    let values = to_bson(&condition.data)?;
                    Bson::Document(doc! { "$in": values })
                }
                FilterOp::Between => {
                    let (low, high) = bounds(condition)?;
                    let low = to_bson(low)?;
                    let high = to_bson(high)?;
                    Bson::Document(doc! { "$gte": low, "$lte": high })
                }
            };
            document.insert(condition.column.clone(), clause);
        }
        Ok(document)
    }

    /// Evaluate against a JSON document with MongoDB semantics: dotted
    /// paths fan out over arrays, range bounds only match values of the
    /// same type.
    pub fn matches(&self, document: &Map<String, Value>) -> bool {
        self.conditions.iter().all(|condition| condition_matches(condition, document))
    }
}

fn condition_matches(condition: &FilterWhereInfo, document: &Map<String, Value>) -> bool {
    let candidates = lookup(document, &condition.column);
    match condition.operator {
        FilterOp::Eq => candidates.iter().any(|candidate| {
            values_equal(candidate, &condition.data)
                || matches!(candidate, Value::Array(items) if items.iter().any(|item| values_equal(item, &condition.data)))
        }),
        FilterOp::In => match &condition.data {
            Value::Array(options) => candidates
                .iter()
                .any(|candidate| options.iter().any(|option| values_equal(candidate, option))),
            _ => false,
        },
        FilterOp::Between => match bounds(condition) {
            Ok((low, high)) => candidates.iter().any(|candidate| {
                same_type(candidate, low)
                    && compare_values(candidate, low).is_ge()
                    && compare_values(candidate, high).is_le()
            }),
            Err(_) => false,
        },
    }
}

fn bounds(condition: &FilterWhereInfo) -> Result<(&Value, &Value), FilterError> {
    match &condition.data {
        Value::Array(values) if values.len() == 2 => Ok((&values[0], &values[1])),
        _ => Err(FilterError::InvalidOperatorData(format!(
            "$between on '{}' requires exactly 2 values",
            condition.column
        ))),
    }
}

fn to_bson(value: &Value) -> Result<Bson, FilterError> {
    mongodb::bson::to_bson(value).map_err(|e| FilterError::Encoding(e.to_string()))
}

/// Resolve a dotted path, descending into every element of intermediate arrays
pub fn lookup<'a>(document: &'a Map<String, Value>, path: &str) -> Vec<&'a Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut found = Vec::new();
    if let Some((head, rest)) = segments.split_first() {
        if let Some(value) = document.get(*head) {
            descend(value, rest, &mut found);
        }
    }
    found
}

fn descend<'a>(value: &'a Value, segments: &[&str], found: &mut Vec<&'a Value>) {
    let Some((head, rest)) = segments.split_first() else {
        found.push(value);
        return;
    };
    match value {
        Value::Object(map) => {
            if let Some(next) = map.get(*head) {
                descend(next, rest, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                descend(item, segments, found);
            }
        }
        _ => {}
    }
}
