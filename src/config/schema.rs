use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::session::HintPolicy;

/// Application configuration.
///
/// Every field is optional; missing values fall back to defaults.
///
/// Example YAML:
/// ```yaml
/// user_name: Ana
/// scenarios_path: ~/drills/scenarios.json
/// hints:
///   after_failures: 3
///   below_score: 70
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Name recorded with every attempt; prompted for when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    /// Scenario store (default: ~/.config/campaign-drill/scenarios.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenarios_path: Option<PathBuf>,

    /// Progress log (default: ~/.config/campaign-drill/progress.jsonl)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints: Option<HintConfig>,
}

/// When projection hints unlock.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HintConfig {
    /// Low-scoring submissions needed before hints show (default: 3)
    #[serde(default)]
    pub after_failures: Option<u32>,

    /// Scores below this count as low (default: 70)
    #[serde(default)]
    pub below_score: Option<u8>,
}

impl Config {
    pub fn scenarios_path(&self) -> PathBuf {
        self.scenarios_path
            .as_deref()
            .map(super::expand_home)
            .unwrap_or_else(crate::scenario::get_scenarios_path)
    }

    pub fn progress_path(&self) -> PathBuf {
        self.progress_path
            .as_deref()
            .map(super::expand_home)
            .unwrap_or_else(crate::progress::get_progress_path)
    }

    pub fn hint_policy(&self) -> HintPolicy {
        let defaults = HintPolicy::default();
        match &self.hints {
            Some(hints) => HintPolicy {
                after_failures: hints.after_failures.unwrap_or(defaults.after_failures),
                below_score: hints.below_score.unwrap_or(defaults.below_score),
            },
            None => defaults,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_parse() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.hint_policy(), HintPolicy::default());
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
user_name: Ana
scenarios_path: /tmp/scenarios.json
progress_path: /tmp/progress.jsonl
hints:
  after_failures: 5
  below_score: 60
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.user_name.as_deref(), Some("Ana"));
        assert_eq!(config.scenarios_path(), PathBuf::from("/tmp/scenarios.json"));
        assert_eq!(config.progress_path(), PathBuf::from("/tmp/progress.jsonl"));
        assert_eq!(
            config.hint_policy(),
            HintPolicy {
                after_failures: 5,
                below_score: 60
            }
        );
    }

    #[test]
    fn test_partial_hints_fall_back() {
        let yaml = r#"
hints:
  below_score: 50
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        let policy = config.hint_policy();
        assert_eq!(policy.after_failures, 3);
        assert_eq!(policy.below_score, 50);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<Config, _> = serde_saphyr::from_str("queries: []");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            user_name: Some("Ana".to_string()),
            scenarios_path: None,
            progress_path: Some(PathBuf::from("/tmp/progress.jsonl")),
            hints: Some(HintConfig {
                after_failures: Some(3),
                below_score: Some(70),
            }),
        };
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}
