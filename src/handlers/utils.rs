// handlers/utils.rs - helpers shared by the resource handlers

use axum::{
    body::Bytes,
    http::{header, HeaderMap},
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use crate::app::AppState;
use crate::auth::TenantContext;
use crate::database::models::tenant::DbConf;
use crate::database::repository::Repository;
use crate::database::store::{from_document, with_deadline, Document};
use crate::error::ApiError;
use crate::filter::QueryPlan;

/// Decode a JSON request body; any syntax or shape error is the fixed
/// malformed-JSON response
pub fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!("Rejected request body: {}", e);
        ApiError::InvalidJson
    })
}

/// `https://{Host}{path}`
pub fn self_link(headers: &HeaderMap, path: &str) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("https://{}{}", host, path)
}

#[derive(Debug, Clone, Serialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: String,
}

/// Data of a create response: the new id and where to find it
#[derive(Debug, Clone, Serialize)]
pub struct CreatedRef {
    pub id: String,
    pub links: Links,
}

impl CreatedRef {
    pub fn new(id: impl Into<String>, headers: &HeaderMap, collection_path: &str) -> Self {
        let id = id.into();
        let self_link = self_link(headers, &format!("{}/{}", collection_path, id));
        Self { id, links: Links { self_link } }
    }
}

/// Store descriptor for `role`; a tenant without one is misconfigured
pub fn tenant_store<'a>(tenant: &'a TenantContext, role: &str) -> Result<&'a DbConf, ApiError> {
    tenant.store(role).ok_or_else(|| {
        error!("Tenant {} has no '{}' store configured", tenant.tenant_name, role);
        ApiError::upstream(format!("tenant {} has no {} store", tenant.tenant_id, role))
    })
}

pub fn repository<T>(state: &AppState, tenant: &TenantContext, role: &str, collection: &str) -> Result<Repository<T>, ApiError>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    let conf = tenant_store(tenant, role)?;
    Ok(Repository::new(
        state.store.clone(),
        conf.clone(),
        collection,
        state.config.query_timeout(),
    ))
}

/// Execute a plan under the configured query deadline
pub async fn run_plan(state: &AppState, conf: &DbConf, collection: &str, plan: &QueryPlan) -> Result<Vec<Document>, ApiError> {
    let query = state.store.aggregate(conf, collection, plan);
    Ok(with_deadline(state.config.query_timeout(), query).await?)
}

pub fn decode_rows<T: DeserializeOwned>(documents: Vec<Document>) -> Result<Vec<T>, ApiError> {
    Ok(documents
        .into_iter()
        .map(from_document)
        .collect::<Result<Vec<T>, _>>()?)
}
