use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::FilterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "$eq")] Eq,
    #[serde(rename = "$in")] In,
    #[serde(rename = "$between")] Between,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterWhereInfo {
    pub column: String,
    pub operator: FilterOp,
    pub data: Value,
}

/// One ascending sort key; every ordering this crate emits is ascending
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: String,
}

impl FilterOrderInfo {
    pub fn asc(column: impl Into<String>) -> Self {
        Self { column: column.into() }
    }
}

/// Size of the aggregation bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Daily,
    Monthly,
}

impl Granularity {
    /// Absent or empty means daily
    pub fn parse(raw: Option<&str>) -> Result<Self, FilterError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Granularity::Daily),
            Some(value) if value.eq_ignore_ascii_case("daily") => Ok(Granularity::Daily),
            Some(value) if value.eq_ignore_ascii_case("monthly") => Ok(Granularity::Monthly),
            Some(other) => Err(FilterError::InvalidGranularity(other.to_string())),
        }
    }

    /// Number of leading characters of a `YYYYMMDD` date kept by the bucket
    pub fn date_len(&self) -> usize {
        match self {
            Granularity::Daily => 8,
            Granularity::Monthly => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Monthly => "monthly",
        }
    }
}

fn type_rank(value: &Value) -> u8 {
    // MongoDB BSON comparison order for the types a JSON document can hold
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

/// Total order over JSON values: type rank first, then value
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (left, right) in x.iter().zip(y.iter()) {
                let ord = compare_values(left, right);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            for ((lk, lv), (rk, rv)) in x.iter().zip(y.iter()) {
                let ord = lk.cmp(rk).then_with(|| compare_values(lv, rv));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Equality where `1` and `1.0` are the same number
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare_values(a, b) == Ordering::Equal,
        _ => a == b,
    }
}

pub fn same_type(a: &Value, b: &Value) -> bool {
    type_rank(a) == type_rank(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn granularity_defaults_to_daily() {
        assert_eq!(Granularity::parse(None).unwrap(), Granularity::Daily);
        assert_eq!(Granularity::parse(Some("")).unwrap(), Granularity::Daily);
        assert_eq!(Granularity::parse(Some("Monthly")).unwrap(), Granularity::Monthly);
        assert!(Granularity::parse(Some("weekly")).is_err());
    }

    #[test]
    fn null_sorts_before_numbers_before_strings() {
        assert_eq!(compare_values(&Value::Null, &json!(1)), Ordering::Less);
        assert_eq!(compare_values(&json!(99), &json!("1")), Ordering::Less);
        assert_eq!(compare_values(&json!("b"), &json!("a")), Ordering::Greater);
        assert!(values_equal(&json!(1), &json!(1.0)));
    }
}
