use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use deco_api::RateLimits;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// `None` when neither the full URI nor its components resolved.
    pub database_uri: Option<String>,
    /// `*` means any origin.
    pub cors_origins: Vec<String>,
    pub rate_limits: RateLimits,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("DECO_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("DECO_PORT")
            .unwrap_or_else(|| "8000".into())
            .parse()
            .context("DECO_PORT is not a valid port")?;

        let cors_origins = var("DECO_CORS_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let defaults = RateLimits::default();
        let rate = |key: &str, default: u32| -> Result<u32> {
            let Some(v) = var(key) else {
                return Ok(default);
            };
            let n: u32 = v.parse().with_context(|| format!("{} is not a number", key))?;
            if n == 0 {
                bail!("{} must be at least 1 (0 would reject every request)", key);
            }
            Ok(n)
        };
        let trust_proxy_headers = match var("DECO_TRUST_PROXY_HEADERS") {
            Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => bail!("DECO_TRUST_PROXY_HEADERS must be true or false, got '{}'", v),
            },
            None => false,
        };
        let rate_limits = RateLimits {
            signup: rate("DECO_RATE_SIGNUP", defaults.signup)?,
            login: rate("DECO_RATE_LOGIN", defaults.login)?,
            trees: rate("DECO_RATE_TREES", defaults.trees)?,
            messages: rate("DECO_RATE_MESSAGES", defaults.messages)?,
            trust_proxy_headers,
        };

        Ok(Self {
            host,
            port,
            database_uri: resolve_database_uri(&var),
            cors_origins,
            rate_limits,
        })
    }
}

/// A full `DECO_DATABASE_URI` wins; anything not shaped like a SQLite `file:`
/// URI is ignored. Otherwise `DECO_DB_DIR` and `DECO_DB_NAME` are assembled.
fn resolve_database_uri(var: &impl Fn(&str) -> Option<String>) -> Option<String> {
    if let Some(uri) = var("DECO_DATABASE_URI") {
        if uri.starts_with("file:") {
            return Some(uri);
        }
        let prefix: String = uri.chars().take(5).collect();
        warn!(
            "DECO_DATABASE_URI found but looks invalid (starts with '{}...'), ignoring it",
            prefix
        );
    }

    match (var("DECO_DB_DIR"), var("DECO_DB_NAME")) {
        (Some(dir), Some(name)) => {
            info!("Constructing database URI from DECO_DB_DIR and DECO_DB_NAME");
            let dir = dir.trim_start_matches("file:").trim_end_matches('/');
            let name = name.strip_suffix(".db").unwrap_or(name.as_str());
            Some(format!("file:{}/{}.db?mode=rwc", dir, name))
        }
        _ => None,
    }
}
