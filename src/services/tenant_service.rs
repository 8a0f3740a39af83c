use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use uuid::Uuid;

use crate::database::models::tenant::{DbConf, Tenant, TenantUser};
use crate::database::repository::Repository;
use crate::database::store::{with_deadline, Store, StoreError};
use crate::filter::FilterWhere;

pub const TENANTS_COLLECTION: &str = "tenants";
pub const AUTHENTICATION_COLLECTION: &str = "authentication";

/// Timestamp format of `created` / `updated` fields
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn now_timestamp() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum TenantError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Invalid tenant name: {0}")]
    InvalidName(String),
}

/// Tenant registry access: CRUD for administrators and API key lookups
/// for authentication
#[derive(Clone)]
pub struct TenantService {
    store: Arc<dyn Store>,
    registry: DbConf,
    deadline: Duration,
}

impl TenantService {
    pub fn new(store: Arc<dyn Store>, registry: DbConf, deadline: Duration) -> Self {
        Self { store, registry, deadline }
    }

    fn repository(&self) -> Repository<Tenant> {
        Repository::new(self.store.clone(), self.registry.clone(), TENANTS_COLLECTION, self.deadline)
    }

    pub async fn list(&self) -> Result<Vec<Tenant>, TenantError> {
        Ok(self.repository().select_all().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Tenant, TenantError> {
        Ok(self.repository().select_404(id).await?)
    }

    /// Register a new tenant; the id and timestamps are assigned here
    pub async fn create(&self, mut tenant: Tenant) -> Result<Tenant, TenantError> {
        self.validate_tenant_name(&tenant.info.name)?;

        let now = now_timestamp();
        tenant.id = Uuid::new_v4().to_string();
        tenant.info.created = now.clone();
        tenant.info.updated = now;

        self.repository().create(&tenant).await?;
        info!("Registered tenant {} ({})", tenant.info.name, tenant.id);
        Ok(tenant)
    }

    /// Replace a tenant, keeping its id and creation time
    pub async fn update(&self, id: &str, mut tenant: Tenant) -> Result<Tenant, TenantError> {
        self.validate_tenant_name(&tenant.info.name)?;

        let repository = self.repository();
        let existing = repository.select_404(id).await?;
        tenant.id = existing.id;
        tenant.info.created = existing.info.created;
        tenant.info.updated = now_timestamp();

        repository.update_404(id, &tenant).await?;
        Ok(tenant)
    }

    pub async fn delete(&self, id: &str) -> Result<(), TenantError> {
        self.repository().delete_404(id).await?;
        info!("Deleted tenant {}", id);
        Ok(())
    }

    /// Tenant and user owning `api_key`
    pub async fn find_by_api_key(&self, api_key: &str) -> Result<Option<(Tenant, TenantUser)>, StoreError> {
        let filter = FilterWhere::new().eq("users.api_key", api_key);
        let tenant = self.repository().select_one(&filter).await?;
        Ok(tenant.and_then(|tenant| {
            let user = tenant.user_by_key(api_key)?.clone();
            Some((tenant, user))
        }))
    }

    /// Whether `api_key` is registered in the administrators' collection
    pub async fn is_admin_key(&self, api_key: &str) -> Result<bool, StoreError> {
        let filter = FilterWhere::new().eq("api_key", api_key);
        let found = with_deadline(
            self.deadline,
            self.store.find_one(&self.registry, AUTHENTICATION_COLLECTION, &filter),
        )
        .await?;
        Ok(found.is_some())
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        with_deadline(self.deadline, self.store.ping(&self.registry)).await
    }

    /// Validate tenant name follows rules
    fn validate_tenant_name(&self, name: &str) -> Result<(), TenantError> {
        if name.trim().is_empty() {
            return Err(TenantError::InvalidName("Tenant name must not be empty".to_string()));
        }
        if name.len() > 100 {
            return Err(TenantError::InvalidName("Tenant name must be less than 100 characters".to_string()));
        }
        Ok(())
    }
}
