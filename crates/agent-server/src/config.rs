//! Server Configuration
//!
//! Every setting comes from the environment (after `.env` is loaded) and is
//! validated once at startup.

use std::str::FromStr;
use std::time::Duration;

use agent_core::AgentError;
use agent_runtime::OpenAiConfig;
use legifrance::lookup::LookupConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name}: cannot parse '{value}'")]
    Unparsable { name: &'static str, value: String },

    #[error("{name}={value} outside {range}")]
    OutOfRange {
        name: &'static str,
        value: String,
        range: &'static str,
    },
}

impl From<ConfigError> for AgentError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Lookup server location and per-call timeout
    pub lookup: LookupConfig,

    /// Chat-completion endpoint
    pub llm: OpenAiConfig,

    pub model: String,
    pub temperature: f32,

    /// `None` when the cap is disabled (`MAX_ITERATIONS=0`)
    pub max_iterations: Option<usize>,

    pub default_max_results: u32,
    pub turn_timeout: Option<Duration>,

    /// How long startup waits for the lookup server
    pub health_check_timeout: Duration,

    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source
    pub fn from_source(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let mcp_timeout: u64 = parse(&get, "MCP_TIMEOUT", 30)?;
        in_range("MCP_TIMEOUT", mcp_timeout, 1, 3600, "1..=3600")?;
        let lookup = LookupConfig::new(
            get("MCP_SERVER_URL").unwrap_or_else(|| "http://127.0.0.1:8000/mcp/".into()),
            Duration::from_secs(mcp_timeout),
        );

        let llm_timeout: u64 = parse(&get, "LLM_TIMEOUT", 120)?;
        in_range("LLM_TIMEOUT", llm_timeout, 1, 3600, "1..=3600")?;
        let llm = OpenAiConfig {
            base_url: get("LLM_BASE_URL").unwrap_or_else(|| "http://localhost:11434/v1".into()),
            api_key: get("LLM_API_KEY").or_else(|| get("OPENAI_API_KEY")),
            timeout_secs: llm_timeout,
        };

        let temperature: f32 = parse(&get, "MODEL_TEMPERATURE", 0.0)?;
        in_range("MODEL_TEMPERATURE", temperature, 0.0, 2.0, "0.0..=2.0")?;

        let max_iterations: usize = parse(&get, "MAX_ITERATIONS", 20)?;
        in_range("MAX_ITERATIONS", max_iterations, 0, 100, "0..=100")?;

        let default_max_results: u32 = parse(&get, "DEFAULT_MAX_RESULTS", 10)?;
        in_range("DEFAULT_MAX_RESULTS", default_max_results, 1, 50, "1..=50")?;

        let turn_timeout = Some(Duration::from_secs(parse(&get, "TURN_TIMEOUT", 0_u64)?))
            .filter(|t| !t.is_zero());

        Ok(Self {
            lookup,
            llm,
            model: get("MODEL_NAME").unwrap_or_else(|| "llama3.2".into()),
            temperature,
            max_iterations: (max_iterations > 0).then_some(max_iterations),
            default_max_results,
            turn_timeout,
            health_check_timeout: Duration::from_secs(parse(&get, "HEALTH_CHECK_TIMEOUT", 30_u64)?),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
        })
    }
}

fn parse<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Unparsable { name, value }),
        None => Ok(default),
    }
}

fn in_range<T: PartialOrd + ToString>(
    name: &'static str,
    value: T,
    min: T,
    max: T,
    range: &'static str,
) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            name,
            value: value.to_string(),
            range,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        AppConfig::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.lookup.invoke_url(), "http://127.0.0.1:8000/mcp/invoke");
        assert_eq!(config.lookup.timeout, Duration::from_secs(30));
        assert_eq!(config.llm.base_url, "http://localhost:11434/v1");
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.max_iterations, Some(20));
        assert_eq!(config.default_max_results, 10);
        assert!(config.turn_timeout.is_none());
        assert_eq!(config.health_check_timeout, Duration::from_secs(30));
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("MCP_SERVER_URL", "http://lookup:9000/"),
            ("MCP_TIMEOUT", "5"),
            ("OPENAI_API_KEY", "sk-test"),
            ("MODEL_NAME", "gpt-4o-mini"),
            ("MODEL_TEMPERATURE", "0.3"),
            ("MAX_ITERATIONS", "0"),
            ("TURN_TIMEOUT", "90"),
        ])
        .unwrap();

        assert_eq!(config.lookup.base_url, "http://lookup:9000");
        assert_eq!(config.lookup.timeout, Duration::from_secs(5));
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.model, "gpt-4o-mini");
        assert!(config.max_iterations.is_none());
        assert_eq!(config.turn_timeout, Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config(&[("MCP_TIMEOUT", "trente")]),
            Err(ConfigError::Unparsable { name: "MCP_TIMEOUT", .. })
        ));
        assert!(matches!(
            config(&[("MCP_TIMEOUT", "0")]),
            Err(ConfigError::OutOfRange { name: "MCP_TIMEOUT", .. })
        ));
        assert!(matches!(
            config(&[("LLM_TIMEOUT", "0")]),
            Err(ConfigError::OutOfRange { name: "LLM_TIMEOUT", .. })
        ));
        assert!(matches!(
            config(&[("MAX_ITERATIONS", "101")]),
            Err(ConfigError::OutOfRange { name: "MAX_ITERATIONS", .. })
        ));
        assert!(matches!(
            config(&[("DEFAULT_MAX_RESULTS", "0")]),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(matches!(
            config(&[("MODEL_TEMPERATURE", "2.5")]),
            Err(ConfigError::OutOfRange { .. })
        ));

        let err: AgentError = ConfigError::Unparsable { name: "X", value: "y".into() }.into();
        assert!(matches!(err, AgentError::Config(_)));
    }
}
