use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, sourced from the environment. Every variable is
/// optional; absent tiers are simply skipped at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub premium_api_key: Option<String>,
    pub free_api_key: Option<String>,
    pub free_user_identity: Option<String>,
    pub free_daily_budget: u32,
    pub broad_enabled: bool,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub provider_timeout: Duration,
    pub group_concurrency: usize,
    pub dm_concurrency: usize,
    pub broadcast_deadline: Duration,
    /// Overrides the embedded language directory when set.
    pub language_directory_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            premium_api_key: None,
            free_api_key: None,
            free_user_identity: None,
            free_daily_budget: 500,
            broad_enabled: true,
            cache_ttl: Duration::from_secs(21600),
            cache_capacity: 10000,
            provider_timeout: Duration::from_millis(8000),
            group_concurrency: 10,
            dm_concurrency: 5,
            broadcast_deadline: Duration::from_millis(30000),
            language_directory_path: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self {
            premium_api_key: non_empty_var("PREMIUM_API_KEY"),
            free_api_key: non_empty_var("FREE_API_KEY"),
            free_user_identity: non_empty_var("FREE_USER_IDENTITY"),
            free_daily_budget: std::env::var("FREE_DAILY_BUDGET")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .expect("FREE_DAILY_BUDGET must be a number"),
            broad_enabled: std::env::var("BROAD_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .expect("BROAD_ENABLED must be true or false"),
            cache_ttl: Duration::from_secs(
                std::env::var("TRANSLATION_CACHE_TTL_SECONDS")
                    .unwrap_or_else(|_| "21600".to_string())
                    .parse()
                    .expect("TRANSLATION_CACHE_TTL_SECONDS must be a number"),
            ),
            cache_capacity: std::env::var("TRANSLATION_CACHE_CAPACITY")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .expect("TRANSLATION_CACHE_CAPACITY must be a number"),
            provider_timeout: Duration::from_millis(
                std::env::var("PROVIDER_TIMEOUT_MS")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .expect("PROVIDER_TIMEOUT_MS must be a number"),
            ),
            group_concurrency: std::env::var("BROADCAST_GROUP_CONCURRENCY")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("BROADCAST_GROUP_CONCURRENCY must be a number"),
            dm_concurrency: std::env::var("BROADCAST_DM_CONCURRENCY")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("BROADCAST_DM_CONCURRENCY must be a number"),
            broadcast_deadline: Duration::from_millis(
                std::env::var("BROADCAST_DEADLINE_MS")
                    .unwrap_or_else(|_| "30000".to_string())
                    .parse()
                    .expect("BROADCAST_DEADLINE_MS must be a number"),
            ),
            language_directory_path: non_empty_var("LANGUAGE_DIRECTORY_PATH").map(PathBuf::from),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_contract() {
        let config = ServiceConfig::default();
        assert_eq!(config.cache_ttl, Duration::from_secs(21600));
        assert_eq!(config.cache_capacity, 10000);
        assert_eq!(config.provider_timeout, Duration::from_millis(8000));
        assert_eq!(config.group_concurrency, 10);
        assert_eq!(config.dm_concurrency, 5);
        assert!(config.broad_enabled);
        assert!(config.premium_api_key.is_none());
    }
}
