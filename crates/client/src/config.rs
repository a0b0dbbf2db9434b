use chrono::Duration;
use clinica_core::cache::CacheConfig;
use clinica_core::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Longest freshness or retention window accepted from the environment.
const MAX_WINDOW_SECS: i64 = 7 * 24 * 60 * 60;

/// Invalid client configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without trailing slash.
    pub api_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Default rows per list page.
    pub page_size: i64,
    /// Seconds a cached page is served without refetching.
    pub stale_secs: i64,
    /// Seconds a cached page is kept at all.
    pub cache_ttl_secs: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000/api".to_string(),
            request_timeout_secs: 30,
            page_size: DEFAULT_PAGE_SIZE,
            stale_secs: 30,
            cache_ttl_secs: 300,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                        | Default                     |
    /// |--------------------------------|-----------------------------|
    /// | `CLINICA_API_URL`              | `http://localhost:3000/api` |
    /// | `CLINICA_REQUEST_TIMEOUT_SECS` | `30`                        |
    /// | `CLINICA_PAGE_SIZE`            | `10`                        |
    /// | `CLINICA_STALE_SECS`           | `30`                        |
    /// | `CLINICA_CACHE_TTL_SECS`       | `300`                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = lookup("CLINICA_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "CLINICA_API_URL",
                value: api_url,
                reason: "must be an http(s) URL",
            });
        }

        let request_timeout_secs = parse_var(
            &lookup,
            "CLINICA_REQUEST_TIMEOUT_SECS",
            defaults.request_timeout_secs,
        )?;
        if request_timeout_secs == 0 {
            return Err(invalid("CLINICA_REQUEST_TIMEOUT_SECS", "0", "must be positive"));
        }

        let page_size = parse_var(&lookup, "CLINICA_PAGE_SIZE", defaults.page_size)?;
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(invalid(
                "CLINICA_PAGE_SIZE",
                &page_size.to_string(),
                "must be between 1 and 100",
            ));
        }

        let stale_secs = parse_var(&lookup, "CLINICA_STALE_SECS", defaults.stale_secs)?;
        check_window("CLINICA_STALE_SECS", stale_secs)?;

        let cache_ttl_secs = parse_var(&lookup, "CLINICA_CACHE_TTL_SECS", defaults.cache_ttl_secs)?;
        check_window("CLINICA_CACHE_TTL_SECS", cache_ttl_secs)?;
        if cache_ttl_secs < stale_secs {
            return Err(invalid(
                "CLINICA_CACHE_TTL_SECS",
                &cache_ttl_secs.to_string(),
                "must not be shorter than CLINICA_STALE_SECS",
            ));
        }

        Ok(Self {
            api_url,
            request_timeout_secs,
            page_size,
            stale_secs,
            cache_ttl_secs,
        })
    }

    /// Cache windows derived from this configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            stale_time: Duration::seconds(self.stale_secs),
            cache_time: Duration::seconds(self.cache_ttl_secs),
        }
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

fn invalid(var: &'static str, value: &str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason,
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid(var, &raw, "not a valid number")),
    }
}

fn check_window(var: &'static str, secs: i64) -> Result<(), ConfigError> {
    if (0..=MAX_WINDOW_SECS).contains(&secs) {
        Ok(())
    } else {
        Err(invalid(var, &secs.to_string(), "must be between 0 and 604800"))
    }
}
