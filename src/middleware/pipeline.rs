//! Per-route request pipeline: authenticate, validate, then dispatch with a
//! [`RequestContext`] attached to the request.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::{auth, validate};
use crate::auth::{AuthContext, TenantContext, TenantResolver};
use crate::error::ApiError;
use crate::filter::RawParams;
use crate::types::Representation;

/// `"<resource>.<action>"`, e.g. `reports.create`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteName(pub &'static str);

impl RouteName {
    pub fn resource(&self) -> &'static str {
        self.0.split('.').next().unwrap_or_default()
    }

    pub fn requires_admin(&self) -> bool {
        self.resource() == "tenants"
    }
}

/// Everything a handler learns from the pipeline. Lives for one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub route: RouteName,
    pub auth: AuthContext,
    pub representation: Representation,
}

impl RequestContext {
    /// The caller's tenant; administrators have none
    pub fn tenant(&self) -> Result<&TenantContext, ApiError> {
        match &self.auth {
            AuthContext::Tenant(ctx) => Ok(ctx),
            AuthContext::Admin => Err(ApiError::Unauthorized),
        }
    }
}

#[derive(Clone)]
pub struct RequestPipeline {
    resolver: TenantResolver,
}

impl RequestPipeline {
    pub fn new(resolver: TenantResolver) -> Self {
        Self { resolver }
    }

    pub async fn authenticate(&self, route: RouteName, headers: &HeaderMap) -> Result<AuthContext, ApiError> {
        let auth = auth::authenticate(&self.resolver, headers, route.requires_admin()).await?;
        debug!("Authenticated request for {}", route.0);
        Ok(auth)
    }

    pub fn validate(&self, route: RouteName, headers: &HeaderMap, query: Option<&str>) -> Result<Representation, ApiError> {
        let params = RawParams::parse(query);
        let representation = validate::negotiate(headers, &params)?;
        validate::validate_resource(route.resource(), &params)?;
        debug!("Validated request for {} ({})", route.0, representation.as_str());
        Ok(representation)
    }

    /// Authenticate then validate. `None` for OPTIONS, which bypasses both.
    pub async fn run(
        &self,
        route: RouteName,
        method: &Method,
        headers: &HeaderMap,
        query: Option<&str>,
    ) -> Result<Option<RequestContext>, ApiError> {
        if method == Method::OPTIONS {
            return Ok(None);
        }
        let auth = self.authenticate(route, headers).await?;
        let representation = self.validate(route, headers, query)?;
        Ok(Some(RequestContext { route, auth, representation }))
    }
}

/// Middleware state: the shared pipeline plus the name of the route it guards
#[derive(Clone)]
pub struct PipelineState {
    pub pipeline: RequestPipeline,
    pub route: RouteName,
}

pub async fn pipeline_middleware(State(state): State<PipelineState>, mut request: Request, next: Next) -> Response {
    let outcome = state
        .pipeline
        .run(state.route, request.method(), request.headers(), request.uri().query())
        .await;

    match outcome {
        Ok(Some(context)) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Ok(None) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_names_split_on_the_first_dot() {
        assert_eq!(RouteName("tenants.list").resource(), "tenants");
        assert!(RouteName("tenants.update").requires_admin());
        assert!(!RouteName("reports.list").requires_admin());
        assert_eq!(RouteName("metricResult.get").resource(), "metricResult");
        assert_eq!(RouteName("health").resource(), "health");
    }

    #[test]
    fn administrators_have_no_tenant() {
        let context = RequestContext {
            route: RouteName("reports.list"),
            auth: AuthContext::Admin,
            representation: Representation::Json,
        };
        assert!(matches!(context.tenant(), Err(ApiError::Unauthorized)));
    }
}
