#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use argo_web_api::config::{AppConfig, StoreBackend};
use argo_web_api::database::store::Document;
use argo_web_api::database::{MemoryStore, Store};
use argo_web_api::{app, AppState};

pub const REGISTRY_DB: &str = "argo_core";
pub const ADMIN_KEY: &str = "S3CR3T";

pub const AVENGERS_ID: &str = "6ac7d684-1f8e-4a02-a502-720e8f11e50b";
pub const AVENGERS_AR_DB: &str = "argo_avengers";
pub const AVENGERS_STATUS_DB: &str = "argo_avengers_status";
pub const CAP_KEY: &str = "C4PK3Y";
pub const THOR_KEY: &str = "TH0RK3Y";

pub const GUARDIANS_ID: &str = "6ac7d684-1f8e-4a02-a502-720e8f11e50c";
pub const GUARDIANS_AR_DB: &str = "argo_guardians";
pub const GROOT_KEY: &str = "GR00TK3Y";
pub const STARLORD_KEY: &str = "ST4RL0RDK3Y";

pub const PROFILE: &str = "ch.cern.sam.ROC_CRITICAL";

fn objects(values: Vec<Value>) -> Vec<Document> {
    values.into_iter().filter_map(|v| v.as_object().cloned()).collect()
}

fn tenant(id: &str, name: &str, ar_db: &str, status_db: &str, users: Value) -> Value {
    json!({
        "id": id,
        "info": {
            "name": name,
            "email": format!("{}@example.org", name.to_lowercase()),
            "website": "www.example.org",
            "created": "2015-10-20 02:08:04",
            "updated": "2015-10-20 02:08:04"
        },
        "db_conf": [
            {"store": "ar", "server": "localhost", "port": 27017, "database": ar_db, "username": "", "password": ""},
            {"store": "status", "server": "localhost", "port": 27017, "database": status_db, "username": "", "password": ""}
        ],
        "users": users
    })
}

fn site_row(dt: i64, ngi: &str, site: &str, up: f64, unknown: f64, down: f64) -> Value {
    let a = up / (1.00000001 - unknown) * 100.0;
    let r = up / ((1.00000001 - unknown) - down) * 100.0;
    json!({
        "dt": dt, "ns": "ch.cern.sam", "ap": PROFILE,
        "n": ngi, "s": site,
        "i": "Production", "sc": "EGI", "ss": "EGI",
        "pr": "Y", "m": "Y", "cs": "Certified",
        "up": up, "u": unknown, "d": down,
        "a": a, "r": r
    })
}

fn ngi_row(dt: i64, ngi: &str, up: f64, unknown: f64, down: f64) -> Value {
    json!({
        "dt": dt, "ns": "ch.cern.sam", "ap": PROFILE, "n": ngi,
        "up": up, "u": unknown, "d": down,
        "a": up * 100.0, "r": up * 100.0
    })
}

fn vo_row(dt: i64, vo: &str, up: f64) -> Value {
    json!({
        "dt": dt, "ns": "ch.cern.sam", "ap": PROFILE, "v": vo,
        "up": up, "u": 0.0, "d": 0.0,
        "a": up * 100.0, "r": up * 100.0
    })
}

/// Registry with two tenants plus Avengers' result and status data
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();

    store.insert_many(
        REGISTRY_DB,
        "tenants",
        objects(vec![
            tenant(
                AVENGERS_ID,
                "AVENGERS",
                AVENGERS_AR_DB,
                AVENGERS_STATUS_DB,
                json!([
                    {"name": "cap", "email": "cap@example.org", "api_key": CAP_KEY},
                    {"name": "thor", "email": "thor@example.org", "api_key": THOR_KEY}
                ]),
            ),
            tenant(
                GUARDIANS_ID,
                "GUARDIANS",
                GUARDIANS_AR_DB,
                "argo_guardians_status",
                json!([
                    {"name": "groot", "email": "groot@example.org", "api_key": GROOT_KEY},
                    {"name": "starlord", "email": "starlord@example.org", "api_key": STARLORD_KEY}
                ]),
            ),
        ]),
    );
    store.insert_many(REGISTRY_DB, "authentication", objects(vec![json!({"api_key": ADMIN_KEY})]));

    store.insert_many(
        AVENGERS_AR_DB,
        "sites",
        objects(vec![
            site_row(20150622, "NGI_GRNET", "HG-03-AUTH", 1.0, 0.0, 0.0),
            site_row(20150622, "NGI_GRNET", "HG-01-GRNET", 0.9, 0.05, 0.02),
            site_row(20150623, "NGI_GRNET", "HG-01-GRNET", 0.5, 0.0, 0.5),
            site_row(20150623, "NGI_CH", "CH-CERN", 1.0, 0.0, 0.0),
            site_row(20150710, "NGI_GRNET", "HG-01-GRNET", 1.0, 0.0, 0.0),
        ]),
    );
    store.insert_many(
        AVENGERS_AR_DB,
        "ngis",
        objects(vec![
            ngi_row(20150622, "NGI_GRNET", 0.9, 0.05, 0.02),
            ngi_row(20150623, "NGI_GRNET", 0.9, 0.05, 0.02),
        ]),
    );
    store.insert_many(
        AVENGERS_AR_DB,
        "voreports",
        objects(vec![
            vo_row(20150622, "ops", 1.0),
            vo_row(20150623, "ops", 0.5),
            vo_row(20150622, "atlas", 0.8),
        ]),
    );
    store.insert_many(
        AVENGERS_STATUS_DB,
        "status_sites",
        objects(vec![
            json!({"ts": "2015-05-01T00:00:00Z", "roc": "NGI_GRNET", "site": "HG-01-GRNET", "s": "OK", "ti": 0, "ps": "OK", "p": PROFILE}),
            json!({"ts": "2015-05-01T01:00:00Z", "roc": "NGI_GRNET", "site": "HG-01-GRNET", "s": "CRITICAL", "ti": 10000, "ps": "OK", "p": PROFILE}),
            json!({"ts": "2015-05-01T00:00:00Z", "roc": "NGI_GRNET", "site": "HG-03-AUTH", "s": "OK", "ti": 0, "ps": "OK", "p": PROFILE}),
        ]),
    );
    store.insert_many(
        AVENGERS_STATUS_DB,
        "status_metrics",
        objects(vec![json!({
            "host": "cream01.afroditi.gr", "service": "CREAM-CE", "metric": "emi.cream.CREAMCE-JobSubmit",
            "timestamp": "2015-05-01T01:00:00Z", "status": "CRITICAL",
            "summary": "Cream status is CRITICAL", "message": "Cream job submission test failed",
            "date_integer": 20150501, "time_integer": 10000
        })]),
    );

    store
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.registry.database = REGISTRY_DB.to_string();
    config.store.backend = StoreBackend::Memory;
    config.cache.enabled = true;
    config.cache.capacity = 64;
    config.server.enable_request_logging = false;
    config
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(Arc::new(seeded_store()))
    }

    pub fn with_store(store: Arc<dyn Store>) -> Self {
        let state = AppState::new(test_config(), store);
        let router = app(state.clone());
        Self { state, router }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        api_key: Option<&str>,
        accept: Option<&str>,
        body: Option<&str>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri).header(header::HOST, "localhost:8080");
        if let Some(key) = api_key {
            builder = builder.header("x-api-key", key);
        }
        if let Some(accept) = accept {
            builder = builder.header(header::ACCEPT, accept);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok(TestResponse { status, headers, body: String::from_utf8(bytes.to_vec())? })
    }

    /// GET with JSON accepted
    pub async fn get_json(&self, uri: &str, api_key: &str) -> Result<TestResponse> {
        self.send(Method::GET, uri, Some(api_key), Some("application/json"), None).await
    }
}
