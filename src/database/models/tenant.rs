use serde::{Deserialize, Serialize};

/// Connection descriptor for one store role of a tenant (or the registry)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConf {
    pub store: String,
    pub server: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantUser {
    pub name: String,
    pub email: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantInfo {
    pub name: String,
    pub email: String,
    pub website: String,
    pub created: String,
    pub updated: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tenant {
    pub id: String,
    pub info: TenantInfo,
    pub db_conf: Vec<DbConf>,
    pub users: Vec<TenantUser>,
}

impl Tenant {
    pub fn user_by_key(&self, api_key: &str) -> Option<&TenantUser> {
        self.users.iter().find(|user| user.api_key == api_key)
    }
}
