//! Replay configuration from environment.

use anyhow::Context;
use soar_core::TaskBehaviour;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// JSON file with [`TaskBehaviour`] overrides
    pub behaviour_path: Option<PathBuf>,
    pub sample_interval_s: f64,
    pub seed: u64,
    /// Amplitude of random altitude noise per sample (m)
    pub altitude_noise_m: f64,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            behaviour_path: None,
            sample_interval_s: 2.0,
            seed: 7,
            altitude_noise_m: 0.0,
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or malformed values keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            behaviour_path: lookup("SOAR_BEHAVIOUR").map(PathBuf::from),
            sample_interval_s: lookup("SOAR_SAMPLE_INTERVAL")
                .and_then(|s| s.parse().ok())
                .filter(|v: &f64| *v > 0.0)
                .unwrap_or(defaults.sample_interval_s),
            seed: lookup("SOAR_SEED")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.seed),
            altitude_noise_m: lookup("SOAR_ALTITUDE_NOISE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.altitude_noise_m),
            log_json: lookup("SOAR_LOG_JSON")
                .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.log_json),
        }
    }

    /// Task behaviour from the configured file, or defaults.
    pub fn load_behaviour(&self) -> anyhow::Result<TaskBehaviour> {
        let Some(path) = &self.behaviour_path else {
            return Ok(TaskBehaviour::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading behaviour file {}", path.display()))?;
        TaskBehaviour::from_json(&json)
            .with_context(|| format!("parsing behaviour file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(Config::from_lookup(|_| None), Config::default());
    }

    #[test]
    fn test_values_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("SOAR_SAMPLE_INTERVAL", "0.5"),
            ("SOAR_SEED", "99"),
            ("SOAR_LOG_JSON", "true"),
            ("SOAR_BEHAVIOUR", "/tmp/b.json"),
        ]));
        assert_eq!(config.sample_interval_s, 0.5);
        assert_eq!(config.seed, 99);
        assert!(config.log_json);
        assert_eq!(config.behaviour_path, Some(PathBuf::from("/tmp/b.json")));
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("SOAR_SAMPLE_INTERVAL", "-3"),
            ("SOAR_SEED", "many"),
        ]));
        assert_eq!(config.sample_interval_s, 2.0);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_missing_behaviour_file_is_error() {
        let config = Config {
            behaviour_path: Some(PathBuf::from("/nonexistent/soar-behaviour.json")),
            ..Config::default()
        };
        assert!(config.load_behaviour().is_err());
        assert_eq!(Config::default().load_behaviour().unwrap(), TaskBehaviour::default());
    }
}
