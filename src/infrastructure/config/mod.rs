use anyhow::Context;
use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::time::Duration;

use crate::domain::feed::model::DEFAULT_SOURCE_LABEL;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    // Feed output
    pub source_label: String,
    pub allowed_idents: Option<HashSet<String>>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid port number")?,
            environment: match env::var("ENVIRONMENT").as_deref() {
                Ok("production") => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            db_acquire_timeout_secs: env::var("DB_ACQUIRE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .context("DB_ACQUIRE_TIMEOUT_SECS must be a number of seconds")?,
            source_label: env::var("FEED_SOURCE_LABEL")
                .unwrap_or_else(|_| DEFAULT_SOURCE_LABEL.to_string()),
            allowed_idents: env::var("FEED_ALLOWED_IDENTS")
                .ok()
                .and_then(|raw| parse_ident_list(&raw)),
        };

        Ok(config)
    }

    pub fn db_acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.db_acquire_timeout_secs)
    }
}

/// Comma separated identifiers; blank input means no allow-list.
fn parse_ident_list(raw: &str) -> Option<HashSet<String>> {
    let idents: HashSet<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|ident| !ident.is_empty())
        .map(str::to_string)
        .collect();

    if idents.is_empty() {
        None
    } else {
        Some(idents)
    }
}
