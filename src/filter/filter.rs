use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::Serialize;

use super::error::FilterError;
use super::types::Granularity;

/// Wire format of every time parameter
pub const ZULU_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn parse_zulu(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), ZULU_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Bucket of the zero date 0001-01-01, used when a time does not parse
pub const ZERO_DAY: i64 = 10_101;

/// `YYYYMMDD`, or [`ZERO_DAY`] when the time does not parse
pub fn day_bucket(raw: &str) -> i64 {
    parse_zulu(raw)
        .map(|t| t.year() as i64 * 10_000 + t.month() as i64 * 100 + t.day() as i64)
        .unwrap_or(ZERO_DAY)
}

/// `YYYYMM`, or `101` (the zero date's month) when the time does not parse
pub fn month_bucket(raw: &str) -> i64 {
    day_bucket(raw) / 100
}

/// `HHMMSS`, or 0 when the time does not parse
pub fn time_of_day(raw: &str) -> i64 {
    parse_zulu(raw)
        .map(|t| t.hour() as i64 * 10_000 + t.minute() as i64 * 100 + t.second() as i64)
        .unwrap_or(0)
}

/// Decoded query string that keeps repeated keys
#[derive(Debug, Clone, Default)]
pub struct RawParams {
    pairs: Vec<(String, String)>,
}

impl RawParams {
    pub fn parse(query: Option<&str>) -> Self {
        let pairs = query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        Self { pairs }
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// Normalized availability query. Field order is the canonical
/// serialization used for cache keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub start_time: String,
    pub end_time: String,
    pub granularity: Granularity,
    pub group_names: BTreeSet<String>,
    pub flavors: BTreeSet<String>,
    pub profile: Option<String>,
    pub infrastructure: Option<String>,
    pub production: Option<String>,
    pub monitored: Option<String>,
    pub certification: Option<String>,
}

impl Filter {
    pub fn from_params(params: &RawParams) -> Result<Self, FilterError> {
        let owned = |key: &str| params.get(key).map(str::to_string);
        let set = |key: &str| {
            params
                .get_all(key)
                .into_iter()
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
        };

        Ok(Self {
            start_time: params.get("start_time").unwrap_or_default().to_string(),
            end_time: params.get("end_time").unwrap_or_default().to_string(),
            granularity: Granularity::parse(params.get("granularity"))?,
            group_names: set("group_name"),
            flavors: set("flavor"),
            // v1 routes call it `availability_profile`
            profile: owned("availability_profile").or_else(|| owned("profile")),
            infrastructure: owned("infrastructure"),
            production: owned("production"),
            monitored: owned("monitored"),
            certification: owned("certification"),
        })
    }

    pub fn start_day(&self) -> i64 {
        day_bucket(&self.start_time)
    }

    pub fn end_day(&self) -> i64 {
        day_bucket(&self.end_time)
    }

    pub fn start_month(&self) -> i64 {
        month_bucket(&self.start_time)
    }

    pub fn end_month(&self) -> i64 {
        month_bucket(&self.end_time)
    }

    /// Deterministic serialization for cache keys
    pub fn canonical(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_from_zulu_time() {
        assert_eq!(day_bucket("2015-06-20T12:00:00Z"), 20150620);
        assert_eq!(month_bucket("2015-06-20T12:00:00Z"), 201506);
        assert_eq!(time_of_day("2015-06-20T12:34:56Z"), 123456);
    }

    #[test]
    fn unparseable_time_falls_back_to_the_zero_date() {
        // Lenient on purpose: routes without a validator still run the query
        assert_eq!(day_bucket("2015-06-20"), 10101);
        assert_eq!(day_bucket(""), ZERO_DAY);
        assert_eq!(month_bucket("yesterday"), 101);
        assert_eq!(time_of_day("yesterday"), 0);
    }

    #[test]
    fn repeated_group_names_collapse_into_a_set() {
        let params = RawParams::parse(Some(
            "start_time=2015-06-20T12:00:00Z&group_name=B&group_name=A&group_name=B",
        ));
        let filter = Filter::from_params(&params).unwrap();
        let names: Vec<_> = filter.group_names.iter().cloned().collect();
        assert_eq!(names, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn absent_and_empty_flags_differ() {
        let params = RawParams::parse(Some("production=&monitored=Y"));
        let filter = Filter::from_params(&params).unwrap();
        assert_eq!(filter.production.as_deref(), Some(""));
        assert_eq!(filter.monitored.as_deref(), Some("Y"));
        assert_eq!(filter.infrastructure, None);
    }

    #[test]
    fn canonical_form_ignores_parameter_order() {
        let a = Filter::from_params(&RawParams::parse(Some("group_name=X&group_name=Y&profile=p"))).unwrap();
        let b = Filter::from_params(&RawParams::parse(Some("profile=p&group_name=Y&group_name=X"))).unwrap();
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn unknown_granularity_is_rejected() {
        let params = RawParams::parse(Some("granularity=hourly"));
        assert!(Filter::from_params(&params).is_err());
    }
}
