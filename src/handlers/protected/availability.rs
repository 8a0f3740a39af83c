// handlers/protected/availability.rs - availability/reliability results
//
// GET /api/v1/group_availability?group_type=site|ngi|vo
// GET /api/v1/service_flavor_availability

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    Extension,
};
use serde::de::DeserializeOwned;

use crate::api::{render, TreeRows};
use crate::app::AppState;
use crate::cache::resource_name;
use crate::database::models::availability::{NgiAvailability, ServiceFlavorAvailability, SiteAvailability, VoAvailability};
use crate::database::query_builder::{Domain, QueryBuilder, NGIS, SERVICE_FLAVORS, SITES, VOS};
use crate::error::ApiError;
use crate::filter::{Filter, RawParams};
use crate::middleware::{Rendered, RequestContext};
use crate::types::AR_STORE;

use crate::handlers::utils::{decode_rows, run_plan, tenant_store};

pub async fn group_availability(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    RawQuery(query): RawQuery,
) -> Result<Rendered, ApiError> {
    let params = RawParams::parse(query.as_deref());
    match params.get("group_type") {
        Some("site") => serve::<SiteAvailability>(&state, &ctx, &params, SITES).await,
        Some("ngi") => serve::<NgiAvailability>(&state, &ctx, &params, NGIS).await,
        Some("vo") => serve::<VoAvailability>(&state, &ctx, &params, VOS).await,
        Some(other) => Err(ApiError::invalid_parameter(
            "Malformed Parameter",
            format!("Unknown group_type '{}'", other),
        )),
        None => Err(ApiError::invalid_parameter("Missing Parameter", "group_type parameter is required")),
    }
}

pub async fn service_flavor_availability(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    RawQuery(query): RawQuery,
) -> Result<Rendered, ApiError> {
    let params = RawParams::parse(query.as_deref());
    serve::<ServiceFlavorAvailability>(&state, &ctx, &params, SERVICE_FLAVORS).await
}

/// Cache lookup, then plan, run, render; only non-empty results are cached
async fn serve<R>(state: &AppState, ctx: &RequestContext, params: &RawParams, domain: Domain) -> Result<Rendered, ApiError>
where
    R: TreeRows + DeserializeOwned,
{
    let tenant = ctx.tenant()?;
    let filter = Filter::from_params(params)?;
    let resource = resource_name(&tenant.tenant_id, domain.name, ctx.representation);

    if let Some(body) = state.cache.hit(&resource, &filter) {
        return Ok(Rendered::new(ctx.representation, body));
    }

    let conf = tenant_store(tenant, AR_STORE)?;
    let plan = QueryBuilder::new(domain).build(&filter, filter.granularity);
    let rows: Vec<R> = decode_rows(run_plan(state, conf, domain.collection, &plan).await?)?;

    let body = Bytes::from(render(&rows, filter.granularity, ctx.representation)?);
    if !rows.is_empty() {
        state.cache.write(&resource, &filter, body.clone());
    }
    Ok(Rendered::new(ctx.representation, body))
}
