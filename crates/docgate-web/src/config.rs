use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use docgate_core::LimiterConfig;
use serde::Deserialize;

/// A user seeded into the store at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_ttl_hours")]
    pub jwt_ttl_hours: u64,
}

/// Per-client admission settings. Converted to a [`LimiterConfig`] at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_refill_interval_ms")]
    pub refill_interval_ms: u64,
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Use `X-Forwarded-For` / `X-Real-IP` as the client identifier.
    /// Only enable behind a reverse proxy that overwrites them.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

impl RateLimitConfig {
    pub fn limiter_config(&self) -> LimiterConfig {
        LimiterConfig {
            refill_interval: Duration::from_millis(self.refill_interval_ms),
            staleness_threshold: Duration::from_secs(self.stale_after_secs),
            sweep_interval: Duration::from_secs(self.sweep_interval_secs),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_ttl_hours: default_jwt_ttl_hours(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            refill_interval_ms: default_refill_interval_ms(),
            stale_after_secs: default_stale_after_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            trust_proxy_headers: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            static_dir: default_static_dir(),
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::default(),
            users: Vec::new(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    ([0, 0, 0, 0], 8080).into()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_jwt_ttl_hours() -> u64 { 24 }

/// One year.
pub const MAX_JWT_TTL_HOURS: u64 = 24 * 365;
fn default_refill_interval_ms() -> u64 { 200 }
fn default_stale_after_secs() -> u64 { 180 }
fn default_sweep_interval_secs() -> u64 { 60 }

const WEAK_SECRETS: &[&str] = &[
    "change-me-to-a-random-secret",
    "secret",
    "password",
    "jwt-secret",
];

impl ServerConfig {
    /// Returns `true` if any user is configured, which turns on bearer
    /// authentication for the user routes.
    pub fn has_auth(&self) -> bool {
        !self.users.is_empty()
    }

    pub fn is_configured_user(&self, username: &str) -> bool {
        self.users.iter().any(|u| u.username == username)
    }

    /// Reads `$DOCGATE_CONFIG` (if set), applies environment overrides and
    /// validates the result.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match std::env::var_os("DOCGATE_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.finalize()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    fn apply_env(&mut self) -> anyhow::Result<()> {
        if let Ok(addr) = std::env::var("DOCGATE_BIND_ADDR") {
            self.bind_addr = addr.parse()?;
        }
        if let Ok(secret) = std::env::var("DOCGATE_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(dir) = std::env::var("DOCGATE_STATIC_DIR") {
            self.static_dir = PathBuf::from(dir);
        }
        if let Ok(val) = std::env::var("DOCGATE_REFILL_INTERVAL_MS") {
            self.rate_limit.refill_interval_ms = val.parse()?;
        }
        if let Ok(val) = std::env::var("DOCGATE_STALE_AFTER_SECS") {
            self.rate_limit.stale_after_secs = val.parse()?;
        }
        if let Ok(val) = std::env::var("DOCGATE_SWEEP_INTERVAL_SECS") {
            self.rate_limit.sweep_interval_secs = val.parse()?;
        }
        if let Ok(val) = std::env::var("DOCGATE_TRUST_PROXY_HEADERS") {
            self.rate_limit.trust_proxy_headers = matches!(val.as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// Fills in a random JWT secret when none is set and checks settings
    /// that would otherwise only fail at request time.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        if self.auth.jwt_secret.is_empty() {
            self.auth.jwt_secret = uuid::Uuid::new_v4().to_string();
            tracing::warn!(
                "No JWT secret configured. Generated random secret (will change on restart)."
            );
        }

        if self.has_auth() {
            if WEAK_SECRETS.iter().any(|&w| self.auth.jwt_secret == w) {
                anyhow::bail!(
                    "JWT secret matches a known weak/placeholder value. \
                     Set a strong random secret via DOCGATE_JWT_SECRET."
                );
            }
            if self.auth.jwt_secret.len() < 32 {
                tracing::warn!("JWT secret is shorter than 32 characters.");
            }
        }

        if self.auth.jwt_ttl_hours == 0 || self.auth.jwt_ttl_hours > MAX_JWT_TTL_HOURS {
            anyhow::bail!(
                "auth.jwt_ttl_hours must be between 1 and {MAX_JWT_TTL_HOURS}, got {}",
                self.auth.jwt_ttl_hours
            );
        }

        self.rate_limit.limiter_config().validate()?;
        Ok(())
    }
}
