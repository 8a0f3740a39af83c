//! Request validation: content negotiation plus per-resource query checks.
//! Validators collect every field-level problem instead of stopping at the
//! first one.

use axum::http::{header, HeaderMap};

use crate::error::{ApiError, ErrorDetail};
use crate::filter::filter::{parse_zulu, ZULU_FORMAT};
use crate::filter::{Granularity, RawParams};
use crate::types::Representation;

const MISSING: &str = "Missing Parameter";
const MALFORMED: &str = "Malformed Parameter";

/// Representation from `Accept`, overridden by a `format` query parameter.
/// An unsupported `Accept` fails even when `format` is given.
pub fn negotiate(headers: &HeaderMap, params: &RawParams) -> Result<Representation, ApiError> {
    let accept = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok());
    let negotiated = Representation::from_accept(accept).ok_or(ApiError::NotAcceptable)?;

    Ok(params
        .get("format")
        .and_then(Representation::from_format)
        .unwrap_or(negotiated))
}

fn check_time(params: &RawParams, name: &str, errors: &mut Vec<ErrorDetail>) -> Option<chrono::DateTime<chrono::Utc>> {
    match params.get(name) {
        None | Some("") => {
            errors.push(ErrorDetail::bad_request(MISSING, format!("{} parameter is required", name)));
            None
        }
        Some(raw) => {
            let parsed = parse_zulu(raw);
            if parsed.is_none() {
                errors.push(ErrorDetail::bad_request(
                    MALFORMED,
                    format!("{} must be in the format {} (e.g. 2015-06-20T00:00:00Z)", name, ZULU_FORMAT),
                ));
            }
            parsed
        }
    }
}

fn check_range(params: &RawParams, errors: &mut Vec<ErrorDetail>) {
    let start = check_time(params, "start_time", errors);
    let end = check_time(params, "end_time", errors);
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            errors.push(ErrorDetail::bad_request(MALFORMED, "end_time must not be earlier than start_time"));
        }
    }
}

fn check_one_of(params: &RawParams, name: &str, allowed: &[&str], errors: &mut Vec<ErrorDetail>) {
    if let Some(value) = params.get(name) {
        if !allowed.contains(&value) {
            errors.push(ErrorDetail::bad_request(
                MALFORMED,
                format!("{} must be one of: {}", name, allowed.join(", ")),
            ));
        }
    }
}

/// Status timelines: a time range and an optional site/ngi group type
pub fn validate_status_params(params: &RawParams) -> Vec<ErrorDetail> {
    let mut errors = Vec::new();
    check_range(params, &mut errors);
    check_one_of(params, "group_type", &["site", "ngi"], &mut errors);
    errors
}

/// Availability results: a time range, a known granularity and group type
pub fn validate_results_params(params: &RawParams) -> Vec<ErrorDetail> {
    let mut errors = Vec::new();
    check_range(params, &mut errors);
    if let Err(err) = Granularity::parse(params.get("granularity")) {
        errors.push(ErrorDetail::bad_request(err.title(), err.to_string()));
    }
    check_one_of(params, "group_type", &["site", "ngi", "vo"], &mut errors);
    if let Some(format) = params.get("format") {
        if Representation::from_format(format).is_none() {
            errors.push(ErrorDetail::bad_request(MALFORMED, "format must be one of: xml, json"));
        }
    }
    errors
}

/// Metric results: the execution time of the probe run
pub fn validate_metric_params(params: &RawParams) -> Vec<ErrorDetail> {
    let mut errors = Vec::new();
    check_time(params, "exec_time", &mut errors);
    errors
}

/// Run the validators whose name appears in `resource`
pub fn validate_resource(resource: &str, params: &RawParams) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if resource.contains("status") {
        errors.extend(validate_status_params(params));
    }
    if resource.contains("results") {
        errors.extend(validate_results_params(params));
    }
    if resource.contains("metricResult") {
        errors.extend(validate_metric_params(params));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn params(query: &str) -> RawParams {
        RawParams::parse(Some(query))
    }

    fn accept(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn negotiation_defaults_to_xml_and_honours_format() {
        assert_eq!(negotiate(&HeaderMap::new(), &params("")).unwrap(), Representation::Xml);
        assert_eq!(negotiate(&accept("application/json"), &params("")).unwrap(), Representation::Json);
        assert_eq!(negotiate(&accept("*/*"), &params("format=json")).unwrap(), Representation::Json);
        assert_eq!(negotiate(&accept("application/json"), &params("format=xml")).unwrap(), Representation::Xml);
    }

    #[test]
    fn unsupported_accept_is_not_acceptable() {
        assert!(matches!(negotiate(&accept("text/html"), &params("format=json")), Err(ApiError::NotAcceptable)));
    }

    #[test]
    fn results_collects_every_problem() {
        let errors = validate_results_params(&params("start_time=yesterday&granularity=weekly&group_type=planet"));
        let details: Vec<_> = errors.iter().map(|e| e.details.as_str()).collect();
        assert_eq!(errors.len(), 4, "{:?}", details);
        assert!(details.iter().any(|d| d.starts_with("start_time must be")));
        assert!(details.iter().any(|d| *d == "end_time parameter is required"));
        assert!(errors.iter().any(|e| e.message == "Wrong Granularity"));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let errors = validate_status_params(&params("start_time=2015-06-22T00:00:00Z&end_time=2015-06-20T00:00:00Z"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].details, "end_time must not be earlier than start_time");
    }

    #[test]
    fn valid_results_query_passes() {
        let query = "start_time=2015-06-20T00:00:00Z&end_time=2015-06-23T23:59:59Z&granularity=monthly&group_type=ngi";
        assert!(validate_resource("results", &params(query)).is_ok());
    }

    #[test]
    fn resources_without_validators_pass() {
        assert!(validate_resource("reports", &params("start_time=garbage")).is_ok());
        assert!(validate_resource("metricResult", &params("exec_time=2015-06-20T12:00:00Z")).is_ok());
        assert!(validate_resource("metricResult", &params("")).is_err());
    }

    #[test]
    fn format_is_validated_the_way_it_is_negotiated() {
        let base = "start_time=2015-06-01T00:00:00Z&end_time=2015-06-02T00:00:00Z";
        assert!(validate_results_params(&params(&format!("{}&format=JSON", base))).is_empty());
        assert_eq!(negotiate(&HeaderMap::new(), &params("format=JSON")).unwrap(), Representation::Json);

        let errors = validate_results_params(&params(&format!("{}&format=yaml", base)));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].details, "format must be one of: xml, json");
    }
}
