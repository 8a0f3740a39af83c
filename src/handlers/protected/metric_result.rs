// handlers/protected/metric_result.rs - GET /api/v2/metric_result/:endpoint/:metric

use axum::{
    extract::{Path, RawQuery, State},
    Extension,
};

use crate::api::render;
use crate::app::AppState;
use crate::database::models::status::MetricResult;
use crate::database::query_builder::{metric_result_query, STATUS_METRICS_COLLECTION};
use crate::database::repository::Repository;
use crate::error::ApiError;
use crate::filter::{Granularity, RawParams};
use crate::handlers::utils::tenant_store;
use crate::middleware::{Rendered, RequestContext};
use crate::types::STATUS_STORE;

/// Detailed output of the probe run of `metric` on `endpoint` at `exec_time`.
/// No match renders an empty result.
pub async fn get(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((endpoint, metric)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Result<Rendered, ApiError> {
    let tenant = ctx.tenant()?;
    let params = RawParams::parse(query.as_deref());
    let exec_time = params.get("exec_time").unwrap_or_default();

    let conf = tenant_store(tenant, STATUS_STORE)?;
    let repository: Repository<MetricResult> = Repository::new(
        state.store.clone(),
        conf.clone(),
        STATUS_METRICS_COLLECTION,
        state.config.query_timeout(),
    );
    let found = repository
        .select_one(&metric_result_query(&endpoint, &metric, exec_time))
        .await?;

    let rows: Vec<MetricResult> = found.into_iter().collect();
    let body = render(&rows, Granularity::Daily, ctx.representation)?;
    Ok(Rendered::new(ctx.representation, body))
}
