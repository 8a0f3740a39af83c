// handlers/protected/status.rs - GET /api/v1/status/sites/timeline/:group

use axum::{
    extract::{Path, RawQuery, State},
    Extension,
};

use crate::api::render;
use crate::app::AppState;
use crate::database::models::status::StatusSite;
use crate::database::query_builder::{StatusQuery, STATUS_SITES_COLLECTION};
use crate::error::ApiError;
use crate::filter::{Granularity, RawParams};
use crate::handlers::utils::{decode_rows, run_plan, tenant_store};
use crate::middleware::{Rendered, RequestContext};
use crate::types::STATUS_STORE;

/// Status changes of one site, or of every site of an NGI with
/// `group_type=ngi`, within `[start_time, end_time]`
pub async fn sites_timeline(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(group): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Rendered, ApiError> {
    let tenant = ctx.tenant()?;
    let params = RawParams::parse(query.as_deref());

    let status_query = StatusQuery {
        start_time: params.get("start_time").unwrap_or_default().to_string(),
        end_time: params.get("end_time").unwrap_or_default().to_string(),
        profile: params.get("profile").unwrap_or_default().to_string(),
        group_type: params.get("group_type").unwrap_or("site").to_string(),
        group,
    };

    let conf = tenant_store(tenant, STATUS_STORE)?;
    let rows: Vec<StatusSite> = decode_rows(run_plan(&state, conf, STATUS_SITES_COLLECTION, &status_query.build()).await?)?;
    let body = render(&rows, Granularity::Daily, ctx.representation)?;
    Ok(Rendered::new(ctx.representation, body))
}
