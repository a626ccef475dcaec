use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use debate_coordination::{RepetitionPolicy, RoleId, DEFAULT_MAX_TURNS};

/// OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Base URL up to and including `/v1`.
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    /// Per-request deadline applied around every generation call.
    pub timeout: Duration,
}

impl Endpoint {
    /// Local servers (llama.cpp, vLLM, Ollama) run without a key.
    pub fn is_local(&self) -> bool {
        let rest = self
            .base_url
            .trim_start_matches("http://")
            .trim_start_matches("https://");
        ["localhost", "127.0.0.1", "[::1]", "0.0.0.0"]
            .iter()
            .any(|host| rest.starts_with(host))
    }
}

/// Top-level debate runner configuration.
#[derive(Debug, Clone)]
pub struct DebateAgentsConfig {
    pub endpoint: Endpoint,
    pub max_turns: u32,
    pub first_speaker: RoleId,
    pub repetition: RepetitionPolicy,
    /// Human-readable transcript log.
    pub log_path: PathBuf,
    /// Optional JSON run record.
    pub record_path: Option<PathBuf>,
    /// Optional Mermaid export of the engine's phase graph.
    pub graph_path: Option<PathBuf>,
}

impl Default for DebateAgentsConfig {
    fn default() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }
}

impl DebateAgentsConfig {
    /// Build from a variable lookup, falling back to defaults.
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Self {
        fn parse_var<T: std::str::FromStr>(
            get: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            get(key).and_then(|v| v.trim().parse().ok())
        }
        Self {
            endpoint: Endpoint {
                base_url: get("DEBATE_BASE_URL")
                    .unwrap_or_else(|| "https://api.openai.com/v1".into()),
                model: get("DEBATE_MODEL").unwrap_or_else(|| "gpt-4o".into()),
                api_key: get("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
                temperature: parse_var(&get, "DEBATE_TEMPERATURE").unwrap_or(0.7),
                timeout: Duration::from_secs(parse_var(&get, "DEBATE_TIMEOUT_SECS").unwrap_or(120)),
            },
            max_turns: DEFAULT_MAX_TURNS,
            first_speaker: RoleId::Scientist,
            repetition: RepetitionPolicy::default(),
            log_path: get("DEBATE_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("debate_log.txt")),
            record_path: None,
            graph_path: None,
        }
    }

    /// Reject configurations that cannot possibly run.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.api_key.is_none() && !self.endpoint.is_local() {
            bail!(
                "OPENAI_API_KEY environment variable not set (required for {})",
                self.endpoint.base_url
            );
        }
        if self.max_turns == 0 {
            bail!("--max-turns must be at least 1");
        }
        if !self.first_speaker.is_debater() {
            bail!("{} cannot open the debate", self.first_speaker);
        }
        if !(0.0..=2.0).contains(&self.endpoint.temperature) {
            bail!(
                "temperature {} is outside 0.0..=2.0",
                self.endpoint.temperature
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> DebateAgentsConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DebateAgentsConfig::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.endpoint.base_url, "https://api.openai.com/v1");
        assert_eq!(cfg.endpoint.model, "gpt-4o");
        assert!(cfg.endpoint.api_key.is_none());
        assert!((cfg.endpoint.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(cfg.endpoint.timeout, Duration::from_secs(120));
        assert_eq!(cfg.max_turns, 8);
        assert_eq!(cfg.first_speaker, RoleId::Scientist);
        assert_eq!(cfg.log_path, PathBuf::from("debate_log.txt"));
    }

    #[test]
    fn test_env_overrides() {
        let cfg = config(&[
            ("DEBATE_BASE_URL", "http://localhost:8080/v1"),
            ("DEBATE_MODEL", "qwen"),
            ("DEBATE_TEMPERATURE", "0.2"),
            ("DEBATE_TIMEOUT_SECS", "15"),
            ("DEBATE_LOG_PATH", "/tmp/log.txt"),
        ]);
        assert_eq!(cfg.endpoint.model, "qwen");
        assert!((cfg.endpoint.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(cfg.endpoint.timeout, Duration::from_secs(15));
        assert_eq!(cfg.log_path, PathBuf::from("/tmp/log.txt"));
    }

    #[test]
    fn test_unparseable_numbers_fall_back() {
        let cfg = config(&[("DEBATE_TEMPERATURE", "warm"), ("DEBATE_TIMEOUT_SECS", "-1")]);
        assert!((cfg.endpoint.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(cfg.endpoint.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_remote_endpoint_requires_key() {
        let err = config(&[]).validate().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
        assert!(config(&[("OPENAI_API_KEY", "sk-test")]).validate().is_ok());
        assert!(config(&[("OPENAI_API_KEY", "  ")]).validate().is_err());
    }

    #[test]
    fn test_local_endpoint_needs_no_key() {
        let cfg = config(&[("DEBATE_BASE_URL", "http://127.0.0.1:11434/v1")]);
        assert!(cfg.endpoint.is_local());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_debate_settings() {
        let mut cfg = config(&[("OPENAI_API_KEY", "sk-test")]);
        cfg.first_speaker = RoleId::Judge;
        assert!(cfg.validate().is_err());

        let mut cfg = config(&[("OPENAI_API_KEY", "sk-test")]);
        cfg.max_turns = 0;
        assert!(cfg.validate().is_err());
    }
}
