use std::env;

use crate::utils::paging::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub scylla: ScyllaConfig,
    pub jwt: JwtConfig,
    pub app: AppConfig,
    pub admin: Option<AdminSeed>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ScyllaConfig {
    pub nodes: Vec<String>,
    pub keyspace: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub key: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Scylla,
    Memory,
}

impl StoreBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "scylla" => Some(StoreBackend::Scylla),
            "memory" => Some(StoreBackend::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub store_backend: StoreBackend,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            store_backend: StoreBackend::Scylla,
        }
    }
}

/// Account created at startup when it does not exist yet.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        let store_backend = env::var("STORE_BACKEND").unwrap_or_else(|_| "scylla".to_string());

        Ok(Settings {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .map_err(|e| format!("Invalid SERVER_PORT: {}", e))?,
            },
            scylla: ScyllaConfig {
                nodes: env::var("SCYLLA_NODES")
                    .unwrap_or_else(|_| "localhost:9042".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
                keyspace: env::var("SCYLLA_KEYSPACE").unwrap_or_else(|_| "labdesk".to_string()),
                username: env::var("SCYLLA_USERNAME").ok(),
                password: env::var("SCYLLA_PASSWORD").ok(),
            },
            jwt: JwtConfig {
                key: env::var("JWT_KEY").map_err(|_| "JWT_KEY must be set".to_string())?,
                issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "labdesk".to_string()),
                audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "labdesk-clients".to_string()),
            },
            app: AppConfig {
                default_page_size: env::var("DEFAULT_PAGE_SIZE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_PAGE_SIZE),
                max_page_size: env::var("MAX_PAGE_SIZE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(MAX_PAGE_SIZE),
                store_backend: StoreBackend::parse(&store_backend)
                    .ok_or_else(|| format!("Invalid STORE_BACKEND: {}", store_backend))?,
            },
            admin: admin_seed_from_env(),
        })
    }
}

fn admin_seed_from_env() -> Option<AdminSeed> {
    let username = env::var("ADMIN_USERNAME").ok()?;
    let password = env::var("ADMIN_PASSWORD").ok()?;

    Some(AdminSeed {
        email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| format!("{}@localhost", username)),
        roles: env::var("ADMIN_ROLES")
            .unwrap_or_else(|_| "Admin".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        username,
        password,
    })
}
