// handlers/protected/recomputations.rs - GET, POST /api/v2/recomputations

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Extension,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::recomputation::Recomputation;
use crate::database::repository::Repository;
use crate::error::ApiError;
use crate::handlers::utils::{parse_json_body, repository, CreatedRef};
use crate::middleware::{ApiResponse, ApiResult, RequestContext};
use crate::services::tenant_service::now_timestamp;
use crate::types::AR_STORE;

pub const RECOMPUTATIONS_COLLECTION: &str = "recomputations";
const RECOMPUTATIONS_PATH: &str = "/api/v2/recomputations";

/// Fields a caller may set; the requester comes from the API key
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecomputationRequest {
    pub start_time: String,
    pub end_time: String,
    pub reason: String,
    pub report: String,
    pub exclude: Vec<String>,
}

fn recomputations(state: &AppState, ctx: &RequestContext) -> Result<Repository<Recomputation>, ApiError> {
    repository(state, ctx.tenant()?, AR_STORE, RECOMPUTATIONS_COLLECTION)
}

pub async fn list(State(state): State<AppState>, Extension(ctx): Extension<RequestContext>) -> ApiResult<Vec<Recomputation>> {
    let requests = recomputations(&state, &ctx)?.select_all().await?;
    Ok(ApiResponse::success(requests, ctx.representation))
}

/// Queue a recomputation in `pending` state
pub async fn submit(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<CreatedRef> {
    let request: RecomputationRequest = parse_json_body(&body)?;
    let user = &ctx.tenant()?.user;

    let recomputation = Recomputation {
        id: Uuid::new_v4().to_string(),
        requester_name: user.name.clone(),
        requester_email: user.email.clone(),
        reason: request.reason,
        start_time: request.start_time,
        end_time: request.end_time,
        report: request.report,
        exclude: request.exclude,
        status: "pending".to_string(),
        timestamp: now_timestamp(),
    };

    recomputations(&state, &ctx)?.create(&recomputation).await?;
    info!("Recomputation {} of report {} requested by {}", recomputation.id, recomputation.report, recomputation.requester_name);

    Ok(ApiResponse::created(
        "Recomputations successfully created",
        CreatedRef::new(recomputation.id, &headers, RECOMPUTATIONS_PATH),
        ctx.representation,
    ))
}
