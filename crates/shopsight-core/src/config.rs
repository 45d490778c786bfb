//! Engine configuration loaded from environment variables.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Default rotating user-agent pool when `SHOPSIGHT_USER_AGENTS` is unset.
const DEFAULT_USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

/// Tunables for one extraction run. Injected into the engine; the engine
/// never reads the environment itself.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Per-request timeout for every fetch, async or blocking.
    pub request_timeout_secs: u64,
    /// Additional attempts after the first failure for soft errors.
    pub max_retries: u32,
    /// Self-throttle delay applied after every successful fetch.
    pub rate_limit_delay_ms: u64,
    /// Rotating user-agent pool; one is picked per attempt.
    pub user_agents: Vec<String>,
    /// Concurrent page fetches on the primary catalog path.
    pub catalog_concurrency: usize,
    /// Concurrent product-page fetches on the degraded fallback path.
    pub fallback_concurrency: usize,
    /// Delay between sequential competitor analyses.
    pub competitor_delay_ms: u64,
    /// Timeout for competitor platform re-verification fetches. Deliberately
    /// shorter than `request_timeout_secs`: these hit many third-party
    /// domains and a slow one must not stall the batch.
    pub platform_check_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            max_retries: 2,
            rate_limit_delay_ms: 1000,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| (*s).to_owned()).collect(),
            catalog_concurrency: 5,
            fallback_concurrency: 3,
            competitor_delay_ms: 1000,
            platform_check_timeout_secs: 5,
        }
    }
}

/// Load engine configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a set variable fails to parse.
pub fn load_engine_config() -> Result<EngineConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_engine_config(|key| std::env::var(key))
}

/// Build engine configuration using the provided env-var lookup function.
///
/// The parsing/validation logic is decoupled from the process environment so
/// it can be tested with a plain `HashMap` lookup.
fn build_engine_config<F>(lookup: F) -> Result<EngineConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let user_agents = match lookup("SHOPSIGHT_USER_AGENTS") {
        Ok(raw) => {
            let agents: Vec<String> = raw
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
            if agents.is_empty() {
                return Err(ConfigError::InvalidEnvVar {
                    var: "SHOPSIGHT_USER_AGENTS".to_string(),
                    reason: "no user agents in list".to_string(),
                });
            }
            agents
        }
        Err(_) => DEFAULT_USER_AGENTS.iter().map(|s| (*s).to_owned()).collect(),
    };

    Ok(EngineConfig {
        request_timeout_secs: parse_u64("SHOPSIGHT_REQUEST_TIMEOUT_SECS", "30")?,
        max_retries: parse_u32("SHOPSIGHT_MAX_RETRIES", "2")?,
        rate_limit_delay_ms: parse_u64("SHOPSIGHT_RATE_LIMIT_DELAY_MS", "1000")?,
        user_agents,
        catalog_concurrency: parse_usize("SHOPSIGHT_CATALOG_CONCURRENCY", "5")?,
        fallback_concurrency: parse_usize("SHOPSIGHT_FALLBACK_CONCURRENCY", "3")?,
        competitor_delay_ms: parse_u64("SHOPSIGHT_COMPETITOR_DELAY_MS", "1000")?,
        platform_check_timeout_secs: parse_u64("SHOPSIGHT_PLATFORM_CHECK_TIMEOUT_SECS", "5")?,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn build_engine_config_defaults() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_engine_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.max_retries, 2);
        assert_eq!(cfg.rate_limit_delay_ms, 1000);
        assert_eq!(cfg.user_agents.len(), 3);
        assert_eq!(cfg.catalog_concurrency, 5);
        assert_eq!(cfg.fallback_concurrency, 3);
        assert_eq!(cfg.competitor_delay_ms, 1000);
        assert_eq!(cfg.platform_check_timeout_secs, 5);
    }

    #[test]
    fn build_engine_config_overrides() {
        let mut map = HashMap::new();
        map.insert("SHOPSIGHT_MAX_RETRIES", "4");
        map.insert("SHOPSIGHT_CATALOG_CONCURRENCY", "8");
        let cfg = build_engine_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.max_retries, 4);
        assert_eq!(cfg.catalog_concurrency, 8);
    }

    #[test]
    fn build_engine_config_splits_user_agents() {
        let mut map = HashMap::new();
        map.insert("SHOPSIGHT_USER_AGENTS", "agent-one/1.0; agent-two/2.0");
        let cfg = build_engine_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.user_agents, vec!["agent-one/1.0", "agent-two/2.0"]);
    }

    #[test]
    fn build_engine_config_rejects_empty_user_agent_list() {
        let mut map = HashMap::new();
        map.insert("SHOPSIGHT_USER_AGENTS", " ; ");
        let result = build_engine_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPSIGHT_USER_AGENTS"),
            "expected InvalidEnvVar(SHOPSIGHT_USER_AGENTS), got: {result:?}"
        );
    }

    #[test]
    fn build_engine_config_rejects_non_numeric_timeout() {
        let mut map = HashMap::new();
        map.insert("SHOPSIGHT_REQUEST_TIMEOUT_SECS", "not-a-number");
        let result = build_engine_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPSIGHT_REQUEST_TIMEOUT_SECS"),
            "expected InvalidEnvVar(SHOPSIGHT_REQUEST_TIMEOUT_SECS), got: {result:?}"
        );
    }
}
