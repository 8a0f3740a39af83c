use thiserror::Error;
use tracing::debug;

use crate::database::models::tenant::{DbConf, Tenant, TenantUser};
use crate::database::store::StoreError;
use crate::services::tenant_service::TenantService;

/// Header carrying the caller's API key
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing API key")]
    MissingKey,
    #[error("API key is not registered for an administrator")]
    NotAdmin,
    #[error("API key does not belong to any tenant")]
    UnknownKey,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Request-scoped view of the tenant a caller belongs to. Built per
/// request and dropped with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant_id: String,
    pub tenant_name: String,
    pub user: TenantUser,
    stores: Vec<DbConf>,
}

impl TenantContext {
    pub fn new(tenant: Tenant, user: TenantUser) -> Self {
        Self {
            tenant_id: tenant.id,
            tenant_name: tenant.info.name,
            user,
            stores: tenant.db_conf,
        }
    }

    /// Store descriptor for `role`, e.g. "ar" or "status"
    pub fn store(&self, role: &str) -> Option<&DbConf> {
        self.stores.iter().find(|conf| conf.store == role)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    Admin,
    Tenant(TenantContext),
}

/// Maps API keys to callers. Holds no mutable state; every lookup goes to
/// the registry.
#[derive(Clone)]
pub struct TenantResolver {
    tenants: TenantService,
    admin_key: Option<String>,
}

impl TenantResolver {
    pub fn new(tenants: TenantService, admin_key: Option<String>) -> Self {
        let admin_key = admin_key.filter(|key| !key.is_empty());
        Self { tenants, admin_key }
    }

    /// Administrative routes accept only administrator keys; every other
    /// route accepts only tenant users
    pub async fn resolve(&self, api_key: &str, requires_admin: bool) -> Result<AuthContext, AuthError> {
        if requires_admin {
            self.authenticate_admin(api_key).await?;
            Ok(AuthContext::Admin)
        } else {
            self.authenticate_tenant(api_key).await.map(AuthContext::Tenant)
        }
    }

    pub async fn authenticate_admin(&self, api_key: &str) -> Result<(), AuthError> {
        if api_key.is_empty() {
            return Err(AuthError::MissingKey);
        }
        if self.admin_key.as_deref() == Some(api_key) || self.tenants.is_admin_key(api_key).await? {
            debug!("Authenticated administrator");
            return Ok(());
        }
        Err(AuthError::NotAdmin)
    }

    pub async fn authenticate_tenant(&self, api_key: &str) -> Result<TenantContext, AuthError> {
        if api_key.is_empty() {
            return Err(AuthError::MissingKey);
        }
        let (tenant, user) = self
            .tenants
            .find_by_api_key(api_key)
            .await?
            .ok_or(AuthError::UnknownKey)?;
        debug!("Authenticated user {} of tenant {}", user.name, tenant.info.name);
        Ok(TenantContext::new(tenant, user))
    }
}
