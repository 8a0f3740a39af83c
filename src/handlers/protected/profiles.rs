// handlers/protected/profiles.rs - availability profile CRUD
//
// GET, POST   /api/v1/AP
// PUT, DELETE /api/v1/AP/:id

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Extension,
};
use tracing::info;
use uuid::Uuid;

use crate::api::render;
use crate::app::AppState;
use crate::database::models::profile::AvailabilityProfile;
use crate::database::repository::Repository;
use crate::error::ApiError;
use crate::filter::Granularity;
use crate::handlers::utils::{parse_json_body, repository, CreatedRef};
use crate::middleware::{ApiResponse, ApiResult, Rendered, RequestContext};
use crate::types::{Representation, AR_STORE};

pub const PROFILES_COLLECTION: &str = "aps";
const PROFILES_PATH: &str = "/api/v1/AP";

fn profiles(state: &AppState, ctx: &RequestContext) -> Result<Repository<AvailabilityProfile>, ApiError> {
    repository(state, ctx.tenant()?, AR_STORE, PROFILES_COLLECTION)
}

/// XML keeps the profile → AND → OR → Group view; JSON lists the records
pub async fn list(State(state): State<AppState>, Extension(ctx): Extension<RequestContext>) -> Result<Response, ApiError> {
    let rows = profiles(&state, &ctx)?.select_all().await?;
    Ok(match ctx.representation {
        Representation::Xml => Rendered::new(ctx.representation, render(&rows, Granularity::Daily, ctx.representation)?).into_response(),
        Representation::Json => ApiResponse::success(rows, ctx.representation).into_response(),
    })
}

pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<CreatedRef> {
    let mut profile: AvailabilityProfile = parse_json_body(&body)?;
    profile.id = Uuid::new_v4().to_string();

    profiles(&state, &ctx)?.create(&profile).await?;
    info!("Created availability profile {} ({})", profile.name, profile.id);

    Ok(ApiResponse::created(
        "Availability Profile record successfully created",
        CreatedRef::new(profile.id, &headers, PROFILES_PATH),
        ctx.representation,
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<()> {
    let mut profile: AvailabilityProfile = parse_json_body(&body)?;
    profile.id = id.clone();
    profiles(&state, &ctx)?.update_404(&id, &profile).await?;
    Ok(ApiResponse::message("Availability Profile record successfully updated", ctx.representation))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    profiles(&state, &ctx)?.delete_404(&id).await?;
    info!("Deleted availability profile {}", id);
    Ok(ApiResponse::message("Availability Profile record successfully deleted", ctx.representation))
}
