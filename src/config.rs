use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub apigee: ApigeeConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub billing: BillingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64, // seconds
}

/// Connection settings for the Apigee Edge Monetization API.
///
/// Either `token` (OAuth bearer) or `username`/`password` (basic auth) is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApigeeConfig {
    #[serde(default = "default_apigee_endpoint")]
    pub endpoint: String,
    pub organization: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_apigee_endpoint() -> String {
    "https://api.enterprise.apigee.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackendKind {
    Database,
    Memory,
}

impl std::str::FromStr for CacheBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "database" | "db" => Ok(CacheBackendKind::Database),
            "memory" => Ok(CacheBackendKind::Memory),
            other => Err(format!("unknown cache backend: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub backend: CacheBackendKind,
    /// Seconds a cached Edge response stays valid.
    pub max_age: u64,
    /// Seconds between garbage collection runs of expired entries.
    pub gc_interval: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::Memory,
            max_age: 900,
            gc_interval: 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    pub max_statement_history_months: u32,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            max_statement_history_months: 12,
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("failed to parse {config_path}: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 无配置文件：使用环境变量与默认值构建
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let organization = get_env("APIGEE_ORGANIZATION").ok_or(
                    "APIGEE_ORGANIZATION is not set and no config.toml was found",
                )?;
                let cache_defaults = CacheConfig::default();

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: get_env("DATABASE_URL").unwrap_or_default(),
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                    },
                    apigee: ApigeeConfig {
                        endpoint: get_env("APIGEE_ENDPOINT")
                            .unwrap_or_else(default_apigee_endpoint),
                        organization,
                        username: get_env("APIGEE_USERNAME").unwrap_or_default(),
                        password: get_env("APIGEE_PASSWORD").unwrap_or_default(),
                        token: get_env("APIGEE_TOKEN"),
                        timeout_secs: get_env_parse("APIGEE_TIMEOUT_SECS", default_timeout_secs()),
                    },
                    cache: CacheConfig {
                        backend: get_env_parse("CACHE_BACKEND", cache_defaults.backend),
                        max_age: get_env_parse("CACHE_MAX_AGE", cache_defaults.max_age),
                        gc_interval: get_env_parse("CACHE_GC_INTERVAL", cache_defaults.gc_interval),
                    },
                    billing: BillingConfig {
                        max_statement_history_months: get_env_parse(
                            "BILLING_MAX_STATEMENT_HISTORY_MONTHS",
                            12u32,
                        ),
                    },
                }
            }
            Err(e) => {
                return Err(format!("cannot read config file {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("APIGEE_ENDPOINT") {
            self.apigee.endpoint = v;
        }
        if let Ok(v) = env::var("APIGEE_ORGANIZATION") {
            self.apigee.organization = v;
        }
        if let Ok(v) = env::var("APIGEE_USERNAME") {
            self.apigee.username = v;
        }
        if let Ok(v) = env::var("APIGEE_PASSWORD") {
            self.apigee.password = v;
        }
        if let Ok(v) = env::var("APIGEE_TOKEN") {
            self.apigee.token = Some(v);
        }
        if let Ok(v) = env::var("CACHE_BACKEND")
            && let Ok(kind) = v.parse()
        {
            self.cache.backend = kind;
        }
        if let Ok(v) = env::var("CACHE_MAX_AGE")
            && let Ok(n) = v.parse()
        {
            self.cache.max_age = n;
        }
        if let Ok(v) = env::var("CACHE_GC_INTERVAL")
            && let Ok(n) = v.parse()
        {
            self.cache.gc_interval = n;
        }
        if let Ok(v) = env::var("BILLING_MAX_STATEMENT_HISTORY_MONTHS")
            && let Ok(n) = v.parse()
        {
            self.billing.max_statement_history_months = n;
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.apigee.organization.trim().is_empty() {
            return Err("apigee.organization must not be empty".to_string());
        }
        if self.apigee.token.is_none() && self.apigee.username.is_empty() {
            return Err("either apigee.token or apigee.username/password must be set".to_string());
        }
        if self.cache.backend == CacheBackendKind::Database && self.database.url.is_empty() {
            return Err("the database cache backend requires DATABASE_URL".to_string());
        }
        Ok(())
    }
}
