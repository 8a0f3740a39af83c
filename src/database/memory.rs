//! In-process document store
//!
//! Evaluates query plans directly over JSON documents with the same
//! semantics the MongoDB pipeline has for the stages this crate emits.
//! Used for local development (seeded from YAML) and by the test suite.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use tracing::info;

use crate::database::models::tenant::DbConf;
use crate::database::store::{Document, Store, StoreError};
use crate::filter::filter_where::lookup;
use crate::filter::plan::{availability, reliability, Average, Projection, AVAILABILITY, AVG_DOWN, AVG_UNKNOWN, AVG_UP, RELIABILITY};
use crate::filter::{FilterOrder, FilterWhere, QueryPlan, Stage};

type Collections = HashMap<String, Vec<Document>>;

/// Fixture file layout: database name → collection name → documents
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub databases: HashMap<String, HashMap<String, Vec<Value>>>,
}

#[derive(Default)]
pub struct MemoryStore {
    databases: RwLock<HashMap<String, Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: Seed) -> Result<Self, StoreError> {
        let store = Self::new();
        for (database, collections) in seed.databases {
            for (collection, documents) in collections {
                let documents = documents
                    .into_iter()
                    .map(|value| match value {
                        Value::Object(map) => Ok(map),
                        other => Err(StoreError::InvalidDocument(format!(
                            "{}.{}: expected an object, got {}",
                            database, collection, other
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                store.insert_many(&database, &collection, documents);
            }
        }
        Ok(store)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::InvalidDocument(format!("{}: {}", path.display(), e)))?;
        let seed: Seed = serde_yaml::from_str(&raw)
            .map_err(|e| StoreError::InvalidDocument(format!("{}: {}", path.display(), e)))?;
        let store = Self::from_seed(seed)?;
        info!("Seeded memory store from {}", path.display());
        Ok(store)
    }

    pub fn insert_many(&self, database: &str, collection: &str, documents: Vec<Document>) {
        let mut databases = self.databases.write();
        databases
            .entry(database.to_string())
            .or_default()
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
    }

    fn snapshot(&self, conf: &DbConf, collection: &str) -> Vec<Document> {
        self.databases
            .read()
            .get(&conf.database)
            .and_then(|collections| collections.get(collection))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn aggregate(&self, conf: &DbConf, collection: &str, plan: &QueryPlan) -> Result<Vec<Document>, StoreError> {
        Ok(evaluate(plan, self.snapshot(conf, collection)))
    }

    async fn find(&self, conf: &DbConf, collection: &str, filter: &FilterWhere) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .snapshot(conf, collection)
            .into_iter()
            .filter(|document| filter.matches(document))
            .collect())
    }

    async fn insert_one(&self, conf: &DbConf, collection: &str, document: Document) -> Result<(), StoreError> {
        self.insert_many(&conf.database, collection, vec![document]);
        Ok(())
    }

    async fn replace_one(&self, conf: &DbConf, collection: &str, filter: &FilterWhere, document: Document) -> Result<bool, StoreError> {
        let mut databases = self.databases.write();
        let slot = databases
            .get_mut(&conf.database)
            .and_then(|collections| collections.get_mut(collection))
            .and_then(|documents| documents.iter_mut().find(|existing| filter.matches(existing)));
        match slot {
            Some(existing) => {
                *existing = document;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_one(&self, conf: &DbConf, collection: &str, filter: &FilterWhere) -> Result<bool, StoreError> {
        let mut databases = self.databases.write();
        let Some(documents) = databases
            .get_mut(&conf.database)
            .and_then(|collections| collections.get_mut(collection))
        else {
            return Ok(false);
        };
        match documents.iter().position(|existing| filter.matches(existing)) {
            Some(index) => {
                documents.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self, _conf: &DbConf) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Run every stage of `plan` over `documents`
pub fn evaluate(plan: &QueryPlan, documents: Vec<Document>) -> Vec<Document> {
    plan.stages()
        .iter()
        .fold(documents, |documents, stage| apply(stage, documents))
}

fn apply(stage: &Stage, documents: Vec<Document>) -> Vec<Document> {
    match stage {
        Stage::Match(filter) => documents
            .into_iter()
            .filter(|document| filter.matches(document))
            .collect(),
        Stage::Project(Projection::TruncateDate { field, len, keep }) => documents
            .iter()
            .map(|document| truncate_date(document, field, *len, keep))
            .collect(),
        Stage::Project(Projection::Availability { date_field, keys }) => documents
            .iter()
            .map(|document| lift_availability(document, date_field, keys))
            .collect(),
        Stage::GroupAndAverage { date_field, date_len, keys, averages } => {
            group_and_average(documents, date_field, *date_len, keys, averages)
        }
        Stage::Sort(orders) => {
            let mut documents = documents;
            documents.sort_by(|a, b| FilterOrder::compare(orders, a, b));
            documents
        }
    }
}

/// `$substr` semantics: numbers are stringified, missing values become ""
fn substr(value: Option<&Value>, len: usize) -> Value {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    Value::String(text.chars().take(len).collect())
}

fn first<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    lookup(document, path).into_iter().next()
}

fn truncate_date(document: &Document, field: &str, len: usize, keep: &[String]) -> Document {
    let mut projected = Map::new();
    if let Some(id) = document.get("_id") {
        projected.insert("_id".to_string(), id.clone());
    }
    projected.insert(field.to_string(), substr(document.get(field), len));
    for key in keep {
        if let Some(value) = first(document, key) {
            projected.insert(key.clone(), value.clone());
        }
    }
    projected
}

struct Bucket {
    id: Document,
    sums: Vec<(f64, usize)>,
}

fn group_and_average(
    documents: Vec<Document>,
    date_field: &str,
    date_len: usize,
    keys: &[String],
    averages: &[Average],
) -> Vec<Document> {
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for document in &documents {
        let mut id = Map::new();
        id.insert(date_field.to_string(), substr(document.get(date_field), date_len));
        for key in keys {
            id.insert(key.clone(), first(document, key).cloned().unwrap_or(Value::Null));
        }

        let signature = Value::Object(id.clone()).to_string();
        let slot = *index.entry(signature).or_insert_with(|| {
            buckets.push(Bucket { id, sums: vec![(0.0, 0); averages.len()] });
            buckets.len() - 1
        });

        for (sum, average) in buckets[slot].sums.iter_mut().zip(averages) {
            if let Some(value) = first(document, &average.input).and_then(Value::as_f64) {
                sum.0 += value;
                sum.1 += 1;
            }
        }
    }

    buckets
        .into_iter()
        .map(|bucket| {
            let mut grouped = Map::new();
            grouped.insert("_id".to_string(), Value::Object(bucket.id));
            for ((sum, count), average) in bucket.sums.into_iter().zip(averages) {
                let value = if count == 0 { Value::Null } else { number(sum / count as f64) };
                grouped.insert(average.output.clone(), value);
            }
            grouped
        })
        .collect()
}

fn lift_availability(document: &Document, date_field: &str, keys: &[String]) -> Document {
    let id = document.get("_id").and_then(Value::as_object);
    let from_id = |key: &str| id.and_then(|id| id.get(key)).cloned().unwrap_or(Value::Null);

    let mut projected = Map::new();
    projected.insert(date_field.to_string(), from_id(date_field));
    for key in keys {
        projected.insert(key.clone(), from_id(key));
    }

    let up = document.get(AVG_UP).and_then(Value::as_f64);
    let unknown = document.get(AVG_UNKNOWN).and_then(Value::as_f64);
    let down = document.get(AVG_DOWN).and_then(Value::as_f64);
    for (name, value) in [(AVG_UP, up), (AVG_UNKNOWN, unknown), (AVG_DOWN, down)] {
        projected.insert(name.to_string(), value.map(number).unwrap_or(Value::Null));
    }

    let (a, r) = match (up, unknown, down) {
        (Some(up), Some(unknown), Some(down)) => {
            (number(availability(up, unknown)), number(reliability(up, unknown, down)))
        }
        (Some(up), Some(unknown), None) => (number(availability(up, unknown)), Value::Null),
        _ => (Value::Null, Value::Null),
    };
    projected.insert(AVAILABILITY.to_string(), a);
    projected.insert(RELIABILITY.to_string(), r);
    projected
}

fn number(value: f64) -> Value {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}
