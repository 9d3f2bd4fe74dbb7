//! Process configuration
//!
//! Server and session settings come from environment variables with
//! defaults. The goal/objective script can be supplied as a JSON file.

use crate::state_machine::{ObjectiveList, Script, ScriptError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse script {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid script: {0}")]
    Script(#[from] ScriptError),
}

/// Settings for the server and the turn runtime
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub port: u16,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Upper bound on a single completion call
    pub request_timeout: Duration,
    /// Idle time after which a session is dropped
    pub session_ttl: Duration,
    pub sweep_interval: Duration,
    pub script_path: Option<PathBuf>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            session_ttl: DEFAULT_SESSION_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            script_path: None,
        }
    }
}

impl AgentConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unparsable values fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.parse().ok())
                .map_or(default, Duration::from_secs)
        };

        Self {
            port: lookup("AGENT_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            temperature: lookup("AGENT_TEMPERATURE")
                .and_then(|t| t.parse().ok())
                .filter(|t: &f32| (0.0..=2.0).contains(t))
                .unwrap_or(defaults.temperature),
            max_tokens: lookup("AGENT_MAX_TOKENS").and_then(|m| m.parse().ok()),
            request_timeout: secs("AGENT_REQUEST_TIMEOUT_SECS", defaults.request_timeout),
            session_ttl: secs("AGENT_SESSION_TTL_SECS", defaults.session_ttl),
            sweep_interval: secs("AGENT_SWEEP_INTERVAL_SECS", defaults.sweep_interval),
            script_path: lookup("AGENT_SCRIPT_PATH").map(PathBuf::from),
        }
    }
}

/// On-disk script format
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriptFile {
    goal: String,
    objectives: Vec<String>,
}

/// Load the script from `path`, or the built-in default when there is none
pub fn load_script(path: Option<&Path>) -> Result<Script, ConfigError> {
    let Some(path) = path else {
        return Ok(Script::car_service_discount());
    };

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ScriptFile = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let objectives = ObjectiveList::new(file.objectives)?;
    Ok(Script::new(file.goal, objectives)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AgentConfig::from_lookup(|_| None);
        assert_eq!(config, AgentConfig::default());
        assert_eq!(config.port, 8000);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_values_from_lookup() {
        let config = AgentConfig::from_lookup(lookup_from(&[
            ("AGENT_PORT", "9100"),
            ("AGENT_TEMPERATURE", "0.2"),
            ("AGENT_MAX_TOKENS", "256"),
            ("AGENT_REQUEST_TIMEOUT_SECS", "10"),
            ("AGENT_SESSION_TTL_SECS", "120"),
            ("AGENT_SCRIPT_PATH", "/etc/agent/script.json"),
        ]));
        assert_eq!(config.port, 9100);
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.max_tokens, Some(256));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.session_ttl, Duration::from_secs(120));
        assert_eq!(config.sweep_interval, DEFAULT_SWEEP_INTERVAL);
        assert_eq!(
            config.script_path,
            Some(PathBuf::from("/etc/agent/script.json"))
        );
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = AgentConfig::from_lookup(lookup_from(&[
            ("AGENT_PORT", "not-a-port"),
            ("AGENT_TEMPERATURE", "7.5"),
        ]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert!((config.temperature - DEFAULT_TEMPERATURE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_default_script_without_path() {
        let script = load_script(None).unwrap();
        assert_eq!(script, Script::car_service_discount());
    }

    #[test]
    fn test_load_script_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("script.json");
        fs::write(
            &path,
            r#"{ "goal": "Book a table for two", "objectives": ["Greet", "Ask for a time", "Confirm"] }"#,
        )
        .unwrap();

        let script = load_script(Some(&path)).unwrap();
        assert_eq!(script.goal(), "Book a table for two");
        assert_eq!(script.objectives().count(), 3);
        assert_eq!(script.objectives().get(1), Some("Ask for a time"));
    }

    #[test]
    fn test_load_script_rejects_empty_objectives() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("script.json");
        fs::write(&path, r#"{ "goal": "Anything", "objectives": [] }"#).unwrap();

        let err = load_script(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Script(ScriptError::NoObjectives)));
    }

    #[test]
    fn test_load_script_rejects_unknown_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("script.json");
        fs::write(
            &path,
            r#"{ "goal": "g", "objectives": ["a"], "branches": {} }"#,
        )
        .unwrap();

        assert!(matches!(
            load_script(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_script_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.json");
        assert!(matches!(
            load_script(Some(&path)),
            Err(ConfigError::Io { .. })
        ));
    }
}
