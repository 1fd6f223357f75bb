// server/src/config.rs

use crate::errors::{AppError, Result};
use autoparts_core::checkout::StockPolicy;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,
  pub run_migrations: bool,

  /// What checkout does when a cart line exceeds the listing's stock.
  pub stock_policy: StockPolicy,

  /// Header the upstream authentication layer puts the caller's user id in.
  pub identity_header: String,

  pub default_page_limit: i64,
  pub max_page_limit: i64,
}

fn parse_var<T>(name: &str, raw: String) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  raw
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e)))
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = parse_var("SERVER_PORT", get_env("SERVER_PORT").unwrap_or_else(|_| "8080".to_string()))?;
    let database_url = get_env("DATABASE_URL")?;
    let database_max_connections = parse_var(
      "DATABASE_MAX_CONNECTIONS",
      get_env("DATABASE_MAX_CONNECTIONS").unwrap_or_else(|_| "10".to_string()),
    )?;
    let run_migrations = parse_var(
      "RUN_MIGRATIONS",
      get_env("RUN_MIGRATIONS").unwrap_or_else(|_| "true".to_string()),
    )?;
    let stock_policy = parse_var("STOCK_POLICY", get_env("STOCK_POLICY").unwrap_or_else(|_| "clamp".to_string()))?;
    let identity_header = get_env("IDENTITY_HEADER").unwrap_or_else(|_| "X-User-ID".to_string());
    let default_page_limit: i64 = parse_var(
      "DEFAULT_PAGE_LIMIT",
      get_env("DEFAULT_PAGE_LIMIT").unwrap_or_else(|_| "100".to_string()),
    )?;
    let max_page_limit: i64 = parse_var(
      "MAX_PAGE_LIMIT",
      get_env("MAX_PAGE_LIMIT").unwrap_or_else(|_| "1000".to_string()),
    )?;

    if default_page_limit < 1 || max_page_limit < default_page_limit {
      return Err(AppError::Config(format!(
        "Page limits must satisfy 1 <= DEFAULT_PAGE_LIMIT ({}) <= MAX_PAGE_LIMIT ({})",
        default_page_limit, max_page_limit
      )));
    }

    tracing::info!(?stock_policy, %identity_header, "Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      run_migrations,
      stock_policy,
      identity_header,
      default_page_limit,
      max_page_limit,
    })
  }

  /// Clamps caller-supplied paging to the configured bounds.
  pub fn page(&self, skip: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let skip = skip.unwrap_or(0).max(0);
    let limit = limit.unwrap_or(self.default_page_limit).clamp(1, self.max_page_limit);
    (skip, limit)
  }
}

#[cfg(test)]
impl AppConfig {
  pub fn for_tests() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 0,
      database_url: String::new(),
      database_max_connections: 1,
      run_migrations: false,
      stock_policy: StockPolicy::Clamp,
      identity_header: "X-User-ID".to_string(),
      default_page_limit: 100,
      max_page_limit: 1000,
    }
  }
}
