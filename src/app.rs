//! Shared application state and the router

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{delete, get, options, post, put, MethodRouter},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::auth::TenantResolver;
use crate::cache::ResultCache;
use crate::config::AppConfig;
use crate::database::store::Store;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{pipeline_middleware, PipelineState, RequestPipeline, RouteName};
use crate::services::tenant_service::TenantService;

/// Everything handlers share. Injected per router, never global.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub tenants: TenantService,
    pub cache: Arc<ResultCache>,
    pub pipeline: RequestPipeline,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        let tenants = TenantService::new(store.clone(), config.registry.clone(), config.query_timeout());
        let resolver = TenantResolver::new(tenants.clone(), config.security.admin_api_key.clone());
        let cache = Arc::new(ResultCache::new(&config.cache));

        Self {
            config: Arc::new(config),
            store,
            tenants,
            cache,
            pipeline: RequestPipeline::new(resolver),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let pipeline = state.pipeline.clone();
    // Each verb gets its own route name, so the pipeline is layered per
    // method router and the verbs are merged afterwards
    let guard = |route: &'static str, method_router: MethodRouter<AppState>| {
        let layer_state = PipelineState { pipeline: pipeline.clone(), route: RouteName(route) };
        method_router.route_layer(from_fn_with_state(layer_state, pipeline_middleware))
    };

    let router = Router::new()
        .route("/health", get(public::health))
        // Results
        .route(
            "/api/v1/group_availability",
            guard("results.group_availability", get(protected::availability::group_availability)),
        )
        .route(
            "/api/v1/service_flavor_availability",
            guard("results.service_flavor_availability", get(protected::availability::service_flavor_availability)),
        )
        .route(
            "/api/v1/status/sites/timeline/:group",
            guard("status.sites", get(protected::status::sites_timeline)),
        )
        .route(
            "/api/v2/metric_result/:endpoint/:metric",
            guard("metricResult.get", get(protected::metric_result::get)),
        )
        // Availability profiles
        .route(
            "/api/v1/AP",
            guard("aps.list", get(protected::profiles::list))
                .merge(guard("aps.create", post(protected::profiles::create)))
                .merge(options(public::options)),
        )
        .route(
            "/api/v1/AP/:id",
            guard("aps.update", put(protected::profiles::update))
                .merge(guard("aps.delete", delete(protected::profiles::delete))),
        )
        // Recomputations
        .route(
            "/api/v2/recomputations",
            guard("recomputations.list", get(protected::recomputations::list))
                .merge(guard("recomputations.create", post(protected::recomputations::submit)))
                .merge(options(public::options)),
        )
        // Reports
        .route(
            "/api/v2/reports",
            guard("reports.list", get(protected::reports::list))
                .merge(guard("reports.create", post(protected::reports::create)))
                .merge(options(public::options)),
        )
        .route(
            "/api/v2/reports/:id",
            guard("reports.get", get(protected::reports::get))
                .merge(guard("reports.update", put(protected::reports::update)))
                .merge(guard("reports.delete", delete(protected::reports::delete))),
        )
        // Tenants (administrators only)
        .route(
            "/api/v2/admin/tenants",
            guard("tenants.list", get(elevated::tenants::list))
                .merge(guard("tenants.create", post(elevated::tenants::create)))
                .merge(options(public::options)),
        )
        .route(
            "/api/v2/admin/tenants/:id",
            guard("tenants.get", get(elevated::tenants::get))
                .merge(guard("tenants.update", put(elevated::tenants::update)))
                .merge(guard("tenants.delete", delete(elevated::tenants::delete))),
        );

    let max_body = state.config.server.max_request_size_bytes;
    let router = router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body));

    let router = if state.config.security.enable_cors {
        router.layer(cors_layer(&state.config.security.cors_origins))
    } else {
        router
    };

    let router = if state.config.server.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
