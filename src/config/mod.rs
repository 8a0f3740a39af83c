use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::database::models::tenant::DbConf;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub registry: DbConf,
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub max_request_size_bytes: usize,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongodb,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub query_timeout_ms: u64,
    /// YAML fixture loaded into the memory backend at startup
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Key accepted for administrative routes in addition to the
    /// registry's `authentication` collection
    pub admin_api_key: Option<String>,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        AppConfig::development().server
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        AppConfig::development().store
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        AppConfig::development().cache
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        AppConfig::development().security
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, current: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(current)
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::for_environment(env::var("APP_ENV").ok().as_deref()).with_env_overrides()
    }

    /// `ARGO_CONFIG` points at a YAML file; environment overrides apply on top
    pub fn load() -> Result<Self, ConfigError> {
        match env::var("ARGO_CONFIG") {
            Ok(path) if !path.is_empty() => Ok(Self::from_yaml_file(Path::new(&path))?.with_env_overrides()),
            _ => Ok(Self::from_env()),
        }
    }

    pub fn for_environment(name: Option<&str>) -> Self {
        let environment = match name {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply `ARGO_*` overrides from `lookup`
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Server overrides
        if let Some(v) = lookup("ARGO_BIND") {
            self.server.bind = v;
        }
        self.server.port = parse_or(lookup("ARGO_PORT"), self.server.port);
        self.server.max_request_size_bytes =
            parse_or(lookup("ARGO_MAX_REQUEST_SIZE_BYTES"), self.server.max_request_size_bytes);
        self.server.enable_request_logging =
            parse_or(lookup("ARGO_ENABLE_REQUEST_LOGGING"), self.server.enable_request_logging);

        // Registry overrides
        if let Some(v) = lookup("ARGO_REGISTRY_HOST") {
            self.registry.server = v;
        }
        self.registry.port = parse_or(lookup("ARGO_REGISTRY_PORT"), self.registry.port);
        if let Some(v) = lookup("ARGO_REGISTRY_DB") {
            self.registry.database = v;
        }
        if let Some(v) = lookup("ARGO_REGISTRY_USERNAME") {
            self.registry.username = v;
        }
        if let Some(v) = lookup("ARGO_REGISTRY_PASSWORD") {
            self.registry.password = v;
        }

        // Store overrides
        match lookup("ARGO_STORE_BACKEND").as_deref() {
            Some("memory") => self.store.backend = StoreBackend::Memory,
            Some("mongodb") | Some("mongo") => self.store.backend = StoreBackend::Mongodb,
            _ => {}
        }
        self.store.query_timeout_ms = parse_or(lookup("ARGO_QUERY_TIMEOUT_MS"), self.store.query_timeout_ms);
        if let Some(v) = lookup("ARGO_SEED_FILE") {
            self.store.seed_file = Some(PathBuf::from(v));
        }

        // Cache overrides
        self.cache.enabled = parse_or(lookup("ARGO_CACHE_ENABLED"), self.cache.enabled);
        self.cache.capacity = parse_or(lookup("ARGO_CACHE_CAPACITY"), self.cache.capacity);

        // Security overrides
        if let Some(v) = lookup("ARGO_ADMIN_API_KEY") {
            self.security.admin_api_key = Some(v);
        }
        self.security.enable_cors = parse_or(lookup("ARGO_ENABLE_CORS"), self.security.enable_cors);
        if let Some(v) = lookup("ARGO_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.store.query_timeout_ms)
    }

    fn registry(server: &str) -> DbConf {
        DbConf {
            store: "registry".to_string(),
            server: server.to_string(),
            port: 27017,
            database: "argo_core".to_string(),
            username: String::new(),
            password: String::new(),
        }
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind: "127.0.0.1".to_string(),
                port: 8080,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                enable_request_logging: true,
            },
            registry: Self::registry("localhost"),
            store: StoreConfig {
                backend: StoreBackend::Memory,
                query_timeout_ms: 30_000,
                seed_file: None,
            },
            cache: CacheConfig {
                enabled: false,
                capacity: 256,
            },
            security: SecurityConfig {
                admin_api_key: None,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 8080,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
                enable_request_logging: true,
            },
            registry: Self::registry("localhost"),
            store: StoreConfig {
                backend: StoreBackend::Mongodb,
                query_timeout_ms: 15_000,
                seed_file: None,
            },
            cache: CacheConfig {
                enabled: true,
                capacity: 1024,
            },
            security: SecurityConfig {
                admin_api_key: None,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 443,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
                enable_request_logging: false,
            },
            registry: Self::registry("localhost"),
            store: StoreConfig {
                backend: StoreBackend::Mongodb,
                query_timeout_ms: 10_000,
                seed_file: None,
            },
            cache: CacheConfig {
                enabled: true,
                capacity: 4096,
            },
            security: SecurityConfig {
                admin_api_key: None,
                enable_cors: false,
                cors_origins: Vec::new(),
            },
        }
    }
}
