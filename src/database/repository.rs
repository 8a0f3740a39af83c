use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::database::models::tenant::DbConf;
use crate::database::store::{from_document, to_document, with_deadline, Store, StoreError};
use crate::filter::FilterWhere;

/// Typed CRUD over one collection, keyed by the `id` field
pub struct Repository<T> {
    store: Arc<dyn Store>,
    conf: DbConf,
    collection: String,
    deadline: Duration,
    _phantom: PhantomData<T>,
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(store: Arc<dyn Store>, conf: DbConf, collection: impl Into<String>, deadline: Duration) -> Self {
        Self {
            store,
            conf,
            collection: collection.into(),
            deadline,
            _phantom: PhantomData,
        }
    }

    fn by_id(id: &str) -> FilterWhere {
        FilterWhere::new().eq("id", id)
    }

    pub async fn select_any(&self, filter: &FilterWhere) -> Result<Vec<T>, StoreError> {
        let documents = with_deadline(self.deadline, self.store.find(&self.conf, &self.collection, filter)).await?;
        documents.into_iter().map(from_document).collect()
    }

    pub async fn select_all(&self) -> Result<Vec<T>, StoreError> {
        self.select_any(&FilterWhere::new()).await
    }

    pub async fn select_one(&self, filter: &FilterWhere) -> Result<Option<T>, StoreError> {
        let document = with_deadline(self.deadline, self.store.find_one(&self.conf, &self.collection, filter)).await?;
        document.map(from_document).transpose()
    }

    pub async fn select_404(&self, id: &str) -> Result<T, StoreError> {
        self.select_one(&Self::by_id(id))
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("{} {}", self.collection, id)))
    }

    pub async fn create(&self, record: &T) -> Result<(), StoreError> {
        let document = to_document(record)?;
        with_deadline(self.deadline, self.store.insert_one(&self.conf, &self.collection, document)).await
    }

    pub async fn update_404(&self, id: &str, record: &T) -> Result<(), StoreError> {
        let document = to_document(record)?;
        let filter = Self::by_id(id);
        let matched = with_deadline(
            self.deadline,
            self.store.replace_one(&self.conf, &self.collection, &filter, document),
        )
        .await?;
        if matched {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("{} {}", self.collection, id)))
        }
    }

    pub async fn delete_404(&self, id: &str) -> Result<(), StoreError> {
        let filter = Self::by_id(id);
        let deleted = with_deadline(self.deadline, self.store.delete_one(&self.conf, &self.collection, &filter)).await?;
        if deleted {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("{} {}", self.collection, id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::models::report::Report;

    fn repository() -> Repository<Report> {
        let conf = DbConf { database: "argo_test".into(), ..Default::default() };
        Repository::new(Arc::new(MemoryStore::new()), conf, "reports", Duration::from_secs(1))
    }

    #[tokio::test]
    async fn crud_lifecycle() {
        let repo = repository();
        let mut report = Report { id: "r1".into(), ..Default::default() };
        report.info.name = "Critical".into();
        repo.create(&report).await.unwrap();

        assert_eq!(repo.select_404("r1").await.unwrap().info.name, "Critical");

        report.info.name = "Renamed".into();
        repo.update_404("r1", &report).await.unwrap();
        assert_eq!(repo.select_all().await.unwrap()[0].info.name, "Renamed");

        repo.delete_404("r1").await.unwrap();
        assert!(matches!(repo.select_404("r1").await, Err(StoreError::NotFound(_))));
        assert!(matches!(repo.delete_404("r1").await, Err(StoreError::NotFound(_))));
    }
}
