pub mod database;

use std::env;
use std::time::Duration;
use anyhow::{bail, Context, Result};

use crate::services::DEFAULT_RESULT_LIMIT;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub ssl_mode: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        let url = env::var("DATABASE_URL").ok();

        // A full DATABASE_URL makes the individual settings optional
        let password = match env::var("DATABASE_PASSWORD") {
            Ok(password) => password,
            Err(_) if url.is_some() => String::new(),
            Err(_) => bail!("DATABASE_URL or DATABASE_PASSWORD must be set"),
        };

        Ok(Self {
            url,
            host: env::var("DATABASE_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("DATABASE_PORT")
                .unwrap_or_else(|_| "5432".to_string())
                .parse()
                .context("DATABASE_PORT must be a port number")?,
            username: env::var("DATABASE_USER").unwrap_or_else(|_| "postgres".to_string()),
            password,
            database: env::var("DATABASE_NAME").unwrap_or_else(|_| "pharmacy_locator".to_string()),
            ssl_mode: env::var("DATABASE_SSL_MODE").unwrap_or_else(|_| "prefer".to_string()),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            acquire_timeout: Duration::from_secs(
                env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .context("DATABASE_ACQUIRE_TIMEOUT_SECS must be a number of seconds")?,
            ),
        })
    }

    pub fn connection_string(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}?sslmode={}",
                self.username, self.password, self.host, self.port, self.database, self.ssl_mode
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Page size of the ranked availability search
    pub result_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

impl SearchConfig {
    pub fn from_env() -> Result<Self> {
        let result_limit = match env::var("SEARCH_RESULT_LIMIT") {
            Ok(raw) => parse_result_limit(&raw)?,
            Err(_) => DEFAULT_RESULT_LIMIT,
        };

        Ok(Self { result_limit })
    }
}

fn parse_result_limit(raw: &str) -> Result<usize> {
    let limit: usize = raw
        .trim()
        .parse()
        .context("SEARCH_RESULT_LIMIT must be a positive integer")?;
    if limit == 0 {
        bail!("SEARCH_RESULT_LIMIT must be at least 1");
    }
    Ok(limit)
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub search: SearchConfig,
    pub server_host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            database: DatabaseConfig::from_env()?,
            search: SearchConfig::from_env()?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            cors_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
