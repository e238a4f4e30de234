// Configuration type definitions

use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_INTERVAL_MS: u64 = 2500;
const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 48;

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_max_poll_attempts() -> u32 {
    DEFAULT_MAX_POLL_ATTEMPTS
}

/// Backend connection section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Static bearer token; takes precedence over stored credentials
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            token: None,
        }
    }
}

/// Generation polling section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl Config {
    /// Apply `FLASHGEN_API_URL` / `FLASHGEN_TOKEN` style overrides
    ///
    /// `lookup` resolves a variable name; blank values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("FLASHGEN_API_URL").filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(token) = lookup("FLASHGEN_TOKEN").filter(|v| !v.trim().is_empty()) {
            self.api.token = Some(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.generation.poll_interval_ms, 2500);
        assert_eq!(config.generation.max_poll_attempts, 48);
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
[api]
base_url = "https://cards.example.com"

[generation]
max_poll_attempts = 10
"#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://cards.example.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.api.token.is_none());
        assert_eq!(config.generation.poll_interval_ms, 2500);
        assert_eq!(config.generation.max_poll_attempts, 10);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides(|name| match name {
            "FLASHGEN_API_URL" => Some("http://10.0.0.2:9000".to_string()),
            "FLASHGEN_TOKEN" => Some("env-token".to_string()),
            _ => None,
        });

        assert_eq!(config.api.base_url, "http://10.0.0.2:9000");
        assert_eq!(config.api.token.as_deref(), Some("env-token"));
    }

    #[test]
    fn test_blank_env_overrides_ignored() {
        let mut config = Config::default();
        config.apply_env_overrides(|_| Some("   ".to_string()));
        assert_eq!(config, Config::default());
    }

    // Feature: config-system, Property 1: Missing fields use defaults
    // For any subset of the generation fields present in the file, the absent
    // ones take their default values.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_missing_fields_use_defaults(
            interval in prop::option::of(1u64..100_000),
            attempts in prop::option::of(1u32..1000),
        ) {
            let mut toml_content = String::from("[generation]\n");
            if let Some(i) = interval {
                toml_content.push_str(&format!("poll_interval_ms = {}\n", i));
            }
            if let Some(a) = attempts {
                toml_content.push_str(&format!("max_poll_attempts = {}\n", a));
            }

            let config: Config = toml::from_str(&toml_content).unwrap();

            prop_assert_eq!(config.generation.poll_interval_ms, interval.unwrap_or(2500));
            prop_assert_eq!(config.generation.max_poll_attempts, attempts.unwrap_or(48));
        }
    }
}
