use std::env;
use std::str::FromStr;

/// How a resubmitted `vulnerability_id` is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Look the id up first and return the stored fix on a hit.
    ReturnExisting,
    /// Skip the lookup and let the unique constraint reject duplicates with 409.
    Reject,
}

impl FromStr for DuplicatePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "return_existing" => Ok(Self::ReturnExisting),
            "reject" => Ok(Self::Reject),
            _ => Err(()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// LLM provider settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_password: Option<String>,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub llm: LlmConfig,
    pub duplicate_policy: DuplicatePolicy,
    /// `["*"]` allows every origin.
    pub cors_allowed_origins: Vec<String>,
    pub max_body_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let or_default = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_password: lookup("DATABASE_PASSWORD").filter(|v| !v.is_empty()),
            database_max_connections: parse(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            host: or_default("BACKEND_HOST", "0.0.0.0"),
            port: parse(&lookup, "BACKEND_PORT", 5000)?,
            llm: LlmConfig {
                api_key: required("GROQ_API_KEY")?,
                base_url: or_default("LLM_BASE_URL", "https://api.groq.com/openai/v1")
                    .trim_end_matches('/')
                    .to_string(),
                model: or_default("LLM_MODEL", "llama-3.3-70b-versatile"),
                max_tokens: parse(&lookup, "LLM_MAX_TOKENS", 512)?,
                timeout_secs: parse(&lookup, "LLM_TIMEOUT_SECS", 30)?,
                max_retries: parse(&lookup, "LLM_MAX_RETRIES", 2)?,
                initial_backoff_ms: parse(&lookup, "LLM_INITIAL_BACKOFF_MS", 500)?,
                max_backoff_ms: parse(&lookup, "LLM_MAX_BACKOFF_MS", 8000)?,
            },
            duplicate_policy: parse(&lookup, "DUPLICATE_ID_POLICY", DuplicatePolicy::ReturnExisting)?,
            cors_allowed_origins: or_default("CORS_ALLOWED_ORIGINS", "*")
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            max_body_bytes: parse(&lookup, "MAX_BODY_BYTES", 1024 * 1024)?,
        })
    }
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgres://aegis@localhost/aegis"),
        ("GROQ_API_KEY", "gsk_test"),
    ];

    #[test]
    fn defaults_applied() {
        let config = AppConfig::from_lookup(lookup_from(MINIMAL)).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.max_tokens, 512);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::ReturnExisting);
        assert_eq!(config.cors_allowed_origins, vec!["*".to_string()]);
        assert!(config.database_password.is_none());
    }

    #[test]
    fn missing_credential_is_error() {
        let err = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("GROQ_API_KEY")));
    }

    #[test]
    fn invalid_number_is_error() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("BACKEND_PORT", "not-a-port"));
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for BACKEND_PORT: \"not-a-port\""
        );
    }

    #[test]
    fn reject_policy_and_origins_parsed() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("DUPLICATE_ID_POLICY", "Reject"));
        pairs.push(("CORS_ALLOWED_ORIGINS", "https://a.test, https://b.test"));
        pairs.push(("LLM_BASE_URL", "http://localhost:8080/v1/"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(config.cors_allowed_origins.len(), 2);
        assert_eq!(config.llm.base_url, "http://localhost:8080/v1");
    }
}
