use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document as BsonDocument};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::database::models::tenant::DbConf;
use crate::database::store::{Document, Store, StoreError};
use crate::filter::{FilterWhere, QueryPlan};

/// MongoDB store. Clients are created lazily per connection descriptor
/// and shared afterwards; each client owns its own connection pool.
#[derive(Default)]
pub struct DatabaseManager {
    clients: Arc<RwLock<HashMap<String, Client>>>,
}

impl DatabaseManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get existing client or create a new one lazily
    async fn client(&self, conf: &DbConf) -> Result<Client, StoreError> {
        let connection_string = Self::build_connection_string(conf)?;

        // Fast path: try read lock
        {
            let clients = self.clients.read().await;
            if let Some(client) = clients.get(&connection_string) {
                return Ok(client.clone());
            }
        }

        let options = ClientOptions::parse(&connection_string).await?;
        let client = Client::with_options(options)?;

        {
            let mut clients = self.clients.write().await;
            clients
                .entry(connection_string)
                .or_insert_with(|| client.clone());
        }

        info!("Created MongoDB client for: {}:{}/{}", conf.server, conf.port, conf.database);
        Ok(client)
    }

    async fn collection(&self, conf: &DbConf, name: &str) -> Result<Collection<BsonDocument>, StoreError> {
        let client = self.client(conf).await?;
        Ok(client.database(&conf.database).collection(name))
    }

    fn build_connection_string(conf: &DbConf) -> Result<String, StoreError> {
        if conf.server.is_empty() {
            return Err(StoreError::InvalidDescriptor("server is empty".to_string()));
        }
        if conf.database.is_empty() {
            return Err(StoreError::InvalidDescriptor("database is empty".to_string()));
        }

        let port = if conf.port == 0 { 27017 } else { conf.port };
        let mut url = url::Url::parse(&format!("mongodb://{}:{}", conf.server, port))
            .map_err(|e| StoreError::InvalidDescriptor(e.to_string()))?;

        if !conf.username.is_empty() {
            url.set_username(&conf.username)
                .map_err(|_| StoreError::InvalidDescriptor("username rejected".to_string()))?;
            url.set_password(Some(&conf.password))
                .map_err(|_| StoreError::InvalidDescriptor("password rejected".to_string()))?;
        }
        url.set_path(&format!("/{}", conf.database));
        Ok(url.into())
    }

    /// Drop every cached client (e.g., on shutdown)
    pub async fn close_all(&self) {
        let mut clients = self.clients.write().await;
        let count = clients.len();
        clients.clear();
        info!("Released {} MongoDB clients", count);
    }
}

fn to_bson_document(document: Document) -> Result<BsonDocument, StoreError> {
    mongodb::bson::to_document(&Value::Object(document)).map_err(|e| StoreError::InvalidDocument(e.to_string()))
}

fn from_bson_document(document: BsonDocument) -> Document {
    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

#[async_trait]
impl Store for DatabaseManager {
    async fn aggregate(&self, conf: &DbConf, collection: &str, plan: &QueryPlan) -> Result<Vec<Document>, StoreError> {
        let pipeline = plan.to_pipeline()?;
        debug!("Aggregating {} stages over {}.{}", pipeline.len(), conf.database, collection);
        let coll = self.collection(conf, collection).await?;
        let cursor = coll.aggregate(pipeline, None).await?;
        let documents: Vec<BsonDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(from_bson_document).collect())
    }

    async fn find(&self, conf: &DbConf, collection: &str, filter: &FilterWhere) -> Result<Vec<Document>, StoreError> {
        let query = filter.to_document()?;
        let coll = self.collection(conf, collection).await?;
        let cursor = coll.find(query, None).await?;
        let documents: Vec<BsonDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(from_bson_document).collect())
    }

    async fn find_one(&self, conf: &DbConf, collection: &str, filter: &FilterWhere) -> Result<Option<Document>, StoreError> {
        let query = filter.to_document()?;
        let coll = self.collection(conf, collection).await?;
        Ok(coll.find_one(query, None).await?.map(from_bson_document))
    }

    async fn insert_one(&self, conf: &DbConf, collection: &str, document: Document) -> Result<(), StoreError> {
        let document = to_bson_document(document)?;
        let coll = self.collection(conf, collection).await?;
        coll.insert_one(document, None).await?;
        Ok(())
    }

    async fn replace_one(&self, conf: &DbConf, collection: &str, filter: &FilterWhere, document: Document) -> Result<bool, StoreError> {
        let query = filter.to_document()?;
        let document = to_bson_document(document)?;
        let coll = self.collection(conf, collection).await?;
        let result = coll.replace_one(query, document, None).await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_one(&self, conf: &DbConf, collection: &str, filter: &FilterWhere) -> Result<bool, StoreError> {
        let query = filter.to_document()?;
        let coll = self.collection(conf, collection).await?;
        let result = coll.delete_one(query, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn ping(&self, conf: &DbConf) -> Result<(), StoreError> {
        let client = self.client(conf).await?;
        client.database(&conf.database).run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}
