use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::database::models::tenant::DbConf;
use crate::filter::{FilterError, FilterWhere, QueryPlan};

/// Documents travel through the crate as JSON objects
pub type Document = Map<String, Value>;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid connection descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Plan(#[from] FilterError),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

/// Document store the handlers run against. `conf` selects the database;
/// adapters decide how a descriptor maps onto a connection.
#[async_trait]
pub trait Store: Send + Sync {
    async fn aggregate(&self, conf: &DbConf, collection: &str, plan: &QueryPlan) -> Result<Vec<Document>, StoreError>;

    /// Matching documents in natural (insertion) order
    async fn find(&self, conf: &DbConf, collection: &str, filter: &FilterWhere) -> Result<Vec<Document>, StoreError>;

    async fn find_one(&self, conf: &DbConf, collection: &str, filter: &FilterWhere) -> Result<Option<Document>, StoreError> {
        Ok(self.find(conf, collection, filter).await?.into_iter().next())
    }

    async fn insert_one(&self, conf: &DbConf, collection: &str, document: Document) -> Result<(), StoreError>;

    /// Replace the first match; false when nothing matched
    async fn replace_one(&self, conf: &DbConf, collection: &str, filter: &FilterWhere, document: Document) -> Result<bool, StoreError>;

    /// Delete the first match; false when nothing matched
    async fn delete_one(&self, conf: &DbConf, collection: &str, filter: &FilterWhere) -> Result<bool, StoreError>;

    async fn ping(&self, conf: &DbConf) -> Result<(), StoreError>;
}

/// Run a store future under a deadline
pub async fn with_deadline<T, F>(deadline: Duration, query: F) -> Result<T, StoreError>
where
    F: std::future::Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(deadline, query).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(deadline)),
    }
}

/// Turn any serializable record into a store document
pub fn to_document<T: serde::Serialize>(record: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(record).map_err(|e| StoreError::InvalidDocument(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!("expected an object, got {}", other))),
    }
}

pub fn from_document<T: serde::de::DeserializeOwned>(document: Document) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(document)).map_err(|e| StoreError::InvalidDocument(e.to_string()))
}
