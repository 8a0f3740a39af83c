use axum::http::HeaderMap;

use crate::auth::{AuthContext, AuthError, TenantResolver, API_KEY_HEADER};

/// API key from the `x-api-key` header
pub fn extract_api_key(headers: &HeaderMap) -> Result<&str, AuthError> {
    let key = headers
        .get(API_KEY_HEADER)
        .ok_or(AuthError::MissingKey)?
        .to_str()
        .map_err(|_| AuthError::MissingKey)?
        .trim();

    if key.is_empty() {
        return Err(AuthError::MissingKey);
    }
    Ok(key)
}

/// Resolve the caller behind the request's API key
pub async fn authenticate(
    resolver: &TenantResolver,
    headers: &HeaderMap,
    requires_admin: bool,
) -> Result<AuthContext, AuthError> {
    let key = extract_api_key(headers)?;
    resolver.resolve(key, requires_admin).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::database::memory::MemoryStore;
    use crate::database::models::tenant::DbConf;
    use crate::services::tenant_service::TenantService;

    fn admin_only_resolver() -> TenantResolver {
        let registry = DbConf { database: "argo_core".into(), ..Default::default() };
        let tenants = TenantService::new(Arc::new(MemoryStore::new()), registry, Duration::from_secs(1));
        TenantResolver::new(tenants, Some("S3CR3T".into()))
    }

    fn with_key(key: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static(key));
        headers
    }

    #[tokio::test]
    async fn route_kind_selects_the_resolver_branch() {
        let resolver = admin_only_resolver();
        let headers = with_key("S3CR3T");
        assert_eq!(authenticate(&resolver, &headers, true).await.unwrap(), AuthContext::Admin);
        assert!(matches!(authenticate(&resolver, &headers, false).await, Err(AuthError::UnknownKey)));
        assert!(matches!(
            authenticate(&resolver, &HeaderMap::new(), true).await,
            Err(AuthError::MissingKey)
        ));
    }

    #[test]
    fn extracts_trimmed_key() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static(" C4PK3Y "));
        assert_eq!(extract_api_key(&headers).unwrap(), "C4PK3Y");
    }

    #[test]
    fn missing_or_blank_key_is_rejected() {
        assert!(matches!(extract_api_key(&HeaderMap::new()), Err(AuthError::MissingKey)));

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static(""));
        assert!(matches!(extract_api_key(&headers), Err(AuthError::MissingKey)));
    }
}
