// handlers/protected/reports.rs - report CRUD
//
// GET, POST       /api/v2/reports
// GET, PUT, DELETE /api/v2/reports/:id

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    Extension,
};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::report::Report;
use crate::database::repository::Repository;
use crate::error::ApiError;
use crate::handlers::utils::{parse_json_body, repository, CreatedRef};
use crate::middleware::{ApiResponse, ApiResult, RequestContext};
use crate::services::tenant_service::now_timestamp;
use crate::types::AR_STORE;

pub const REPORTS_COLLECTION: &str = "reports";
const REPORTS_PATH: &str = "/api/v2/reports";

fn reports(state: &AppState, ctx: &RequestContext) -> Result<Repository<Report>, ApiError> {
    repository(state, ctx.tenant()?, AR_STORE, REPORTS_COLLECTION)
}

pub async fn list(State(state): State<AppState>, Extension(ctx): Extension<RequestContext>) -> ApiResult<Vec<Report>> {
    let reports = reports(&state, &ctx)?.select_all().await?;
    Ok(ApiResponse::success(reports, ctx.representation))
}

/// The single report, wrapped in a list like the collection view
pub async fn get(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Report>> {
    let report = reports(&state, &ctx)?.select_404(&id).await?;
    Ok(ApiResponse::success(vec![report], ctx.representation))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<CreatedRef> {
    let mut report: Report = parse_json_body(&body)?;
    let now = now_timestamp();
    report.id = Uuid::new_v4().to_string();
    report.info.created = now.clone();
    report.info.updated = now;

    reports(&state, &ctx)?.create(&report).await?;
    info!("Created report {} ({})", report.info.name, report.id);

    Ok(ApiResponse::created(
        "Successfully Created Report",
        CreatedRef::new(report.id, &headers, REPORTS_PATH),
        ctx.representation,
    ))
}

/// Replace a report, keeping its id and creation time
pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<()> {
    let mut report: Report = parse_json_body(&body)?;
    let repository = reports(&state, &ctx)?;
    let existing = repository.select_404(&id).await?;

    report.id = existing.id;
    report.info.created = existing.info.created;
    report.info.updated = now_timestamp();
    repository.update_404(&id, &report).await?;

    Ok(ApiResponse::message("Report was successfully updated", ctx.representation))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    reports(&state, &ctx)?.delete_404(&id).await?;
    info!("Deleted report {}", id);
    Ok(ApiResponse::message("Report was successfully deleted", ctx.representation))
}
