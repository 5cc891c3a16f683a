/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, ticket 検証設定, claim store 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    // Claim cache is enabled only when set.
    pub redis_url: Option<String>,

    pub ticket_signing_secret: String,
    pub ticket_issuer: String,
    pub ticket_cookie_name: String,
    pub ticket_leeway_seconds: u64,

    pub claim_store_timeout: Duration,
    pub claim_cache_ttl: Duration,

    pub request_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print secrets / connection strings
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("claim_cache_enabled", &self.redis_url.is_some())
            .field("ticket_issuer", &self.ticket_issuer)
            .field("ticket_cookie_name", &self.ticket_cookie_name)
            .field("ticket_leeway_seconds", &self.ticket_leeway_seconds)
            .field("claim_store_timeout", &self.claim_store_timeout)
            .field("claim_cache_ttl", &self.claim_cache_ttl)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup (env, test map).
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = get("APP_ENV")
            .map(|raw| AppEnv::parse(&raw))
            .unwrap_or(AppEnv::Development);

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let redis_url = get("REDIS_URL").filter(|s| !s.trim().is_empty());

        let ticket_signing_secret = get("TICKET_SIGNING_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("TICKET_SIGNING_SECRET"))?;

        let ticket_issuer = get("TICKET_ISSUER").ok_or(ConfigError::Missing("TICKET_ISSUER"))?;

        let ticket_cookie_name =
            get("TICKET_COOKIE_NAME").unwrap_or_else(|| ".household.auth".to_string());

        let ticket_leeway_seconds = parse_u64(&get, "TICKET_LEEWAY_SECONDS", 60, 0)?;
        let claim_store_timeout_ms = parse_u64(&get, "CLAIM_STORE_TIMEOUT_MS", 2000, 1)?;
        let claim_cache_ttl_seconds = parse_u64(&get, "CLAIM_CACHE_TTL_SECONDS", 300, 1)?;
        let request_timeout_seconds = parse_u64(&get, "REQUEST_TIMEOUT_SECONDS", 30, 1)?;

        Ok(Self {
            addr,
            app_env,
            database_url,
            redis_url,
            ticket_signing_secret,
            ticket_issuer,
            ticket_cookie_name,
            ticket_leeway_seconds,
            claim_store_timeout: Duration::from_millis(claim_store_timeout_ms),
            claim_cache_ttl: Duration::from_secs(claim_cache_ttl_seconds),
            request_timeout: Duration::from_secs(request_timeout_seconds),
        })
    }
}

// Absent => default. Present but unparsable or below `min` => Invalid(key).
fn parse_u64<F>(get: &F, key: &'static str, default: u64, min: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|v| *v >= min)
            .ok_or(ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
