// handlers/elevated/tenants.rs - tenant registry management
//
// GET, POST        /api/v2/admin/tenants
// GET, PUT, DELETE /api/v2/admin/tenants/:id

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    Extension,
};

use crate::app::AppState;
use crate::database::models::tenant::Tenant;
use crate::handlers::utils::{parse_json_body, CreatedRef};
use crate::middleware::{ApiResponse, ApiResult, RequestContext};

const TENANTS_PATH: &str = "/api/v2/admin/tenants";

pub async fn list(State(state): State<AppState>, Extension(ctx): Extension<RequestContext>) -> ApiResult<Vec<Tenant>> {
    let tenants = state.tenants.list().await?;
    Ok(ApiResponse::success(tenants, ctx.representation))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Tenant>> {
    let tenant = state.tenants.get(&id).await?;
    Ok(ApiResponse::success(vec![tenant], ctx.representation))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<CreatedRef> {
    let tenant: Tenant = parse_json_body(&body)?;
    let created = state.tenants.create(tenant).await?;
    Ok(ApiResponse::created(
        // published message, spelling included
        "Tenant was succesfully created",
        CreatedRef::new(created.id, &headers, TENANTS_PATH),
        ctx.representation,
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<()> {
    let tenant: Tenant = parse_json_body(&body)?;
    state.tenants.update(&id, tenant).await?;
    Ok(ApiResponse::message("Tenant successfully updated", ctx.representation))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.tenants.delete(&id).await?;
    Ok(ApiResponse::message("Tenant Successfully Deleted", ctx.representation))
}
