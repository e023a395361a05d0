//! Centralized configuration (environment variables + defaults).

use std::net::SocketAddr;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub store_backend: StoreBackend,
    /// Present whenever the backend is PostgreSQL.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub bind_addr: SocketAddr,
    /// Prefix of the `X-{app}-alert` style headers.
    pub app_name: String,
    pub log_format: LogFormat,
    pub enable_swagger: bool,
}

impl Settings {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let store_backend = match get("STORE_BACKEND").as_deref().map(str::trim) {
            None => StoreBackend::Postgres,
            Some(v) if v.eq_ignore_ascii_case("postgres") => StoreBackend::Postgres,
            Some(v) if v.eq_ignore_ascii_case("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(invalid("STORE_BACKEND", other, "expected postgres or memory"))
            }
        };

        let database_url = get("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            None => 5,
            Some(v) => match v.trim().parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => return Err(invalid("DB_MAX_CONNECTIONS", &v, "expected a positive integer")),
            },
        };

        let bind_addr = {
            let v = get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
            v.trim()
                .parse::<SocketAddr>()
                .map_err(|e| invalid("BIND_ADDR", &v, &e.to_string()))?
        };

        let app_name = get("APP_NAME")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| "entityCrudApp".to_string());
        if !app_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(invalid("APP_NAME", &app_name, "must be usable in a header name"));
        }

        let log_format = match get("LOG_FORMAT").as_deref().map(str::trim) {
            None => LogFormat::Text,
            Some(v) if v.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(other) => return Err(invalid("LOG_FORMAT", other, "expected text or json")),
        };

        let enable_swagger = match get("ENABLE_SWAGGER") {
            None => true,
            Some(v) => parse_bool(&v).ok_or_else(|| invalid("ENABLE_SWAGGER", &v, "expected true or false"))?,
        };

        Ok(Self {
            store_backend,
            database_url,
            db_max_connections,
            bind_addr,
            app_name,
            log_format,
            enable_swagger,
        })
    }
}

fn invalid(name: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
