//! Configuration loading
//!
//! The delivery layer hands over a JSON object shaped like
//!
//! ```json
//! {
//!   "patterns": [{ "pattern": "^_ga_", "enabled": true }, "^_fbp$"],
//!   "enableLogging": false,
//!   "sweepIntervalMs": 5000
//! }
//! ```
//!
//! Entries may be objects or bare strings (already-filtered active
//! patterns). Flags follow loose truthiness since the settings layer does
//! not guarantee real booleans.

use std::time::Duration;

use cg_core::types::{EngineConfig, PatternEntry};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config must be a JSON object")]
    NotAnObject,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    #[serde(default)]
    patterns: Option<Vec<RawPattern>>,
    #[serde(default)]
    enable_logging: Value,
    #[serde(default)]
    sweep_interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPattern {
    Text(String),
    Entry {
        pattern: String,
        #[serde(default = "enabled_by_default")]
        enabled: Value,
        #[serde(default)]
        description: Option<String>,
    },
}

fn enabled_by_default() -> Value {
    Value::Bool(true)
}

impl From<RawPattern> for PatternEntry {
    fn from(raw: RawPattern) -> Self {
        match raw {
            RawPattern::Text(pattern) => PatternEntry::new(pattern, true),
            RawPattern::Entry {
                pattern,
                enabled,
                description,
            } => PatternEntry {
                pattern,
                enabled: is_truthy(&enabled),
                description,
            },
        }
    }
}

/// Strict loading: malformed JSON or entries are errors.
pub fn parse_config(text: &str) -> Result<EngineConfig, ConfigError> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(ConfigError::NotAnObject);
    }
    let raw: RawConfig = serde_json::from_value(value)?;
    Ok(build_config(
        raw.patterns
            .unwrap_or_default()
            .into_iter()
            .map(PatternEntry::from)
            .collect(),
        is_truthy(&raw.enable_logging),
        raw.sweep_interval_ms,
    ))
}

/// Lenient loading: anything missing or malformed means "no patterns".
///
/// Used where the configuration comes from a page global that may not
/// exist. Malformed entries are skipped one by one.
pub fn config_from_value(value: Option<&Value>) -> EngineConfig {
    let Some(Value::Object(object)) = value else {
        return EngineConfig::default();
    };

    let patterns = match object.get("patterns") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| RawPattern::deserialize(item).ok())
            .map(PatternEntry::from)
            .collect(),
        _ => Vec::new(),
    };

    let enable_logging = object.get("enableLogging").is_some_and(is_truthy);
    let sweep_interval_ms = object.get("sweepIntervalMs").and_then(Value::as_u64);

    build_config(patterns, enable_logging, sweep_interval_ms)
}

fn build_config(patterns: Vec<PatternEntry>, enable_logging: bool, sweep_interval_ms: Option<u64>) -> EngineConfig {
    let config = EngineConfig::new(patterns, enable_logging);
    match sweep_interval_ms {
        Some(ms) => config.with_sweep_interval(Duration::from_millis(ms)),
        None => config,
    }
}

/// Loose truthiness for flags coming from the settings layer.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")),
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_core::types::DEFAULT_SWEEP_INTERVAL;
    use serde_json::json;

    #[test]
    fn test_parse_object_entries() {
        let config = parse_config(
            r#"{
                "patterns": [
                    {"pattern": "^wp-dark-mode-", "enabled": true, "description": "dark mode"},
                    {"pattern": "^foo", "enabled": false}
                ],
                "enableLogging": true
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.patterns,
            vec![
                PatternEntry::new("^wp-dark-mode-", true).with_description("dark mode"),
                PatternEntry::new("^foo", false),
            ]
        );
        assert!(config.enable_logging);
        assert_eq!(config.sweep_interval, DEFAULT_SWEEP_INTERVAL);
    }

    #[test]
    fn test_parse_string_entries_and_interval() {
        let config = parse_config(r#"{"patterns": ["^_ga_", "^_fbp$"], "sweepIntervalMs": 250}"#).unwrap();
        assert_eq!(config.patterns.len(), 2);
        assert!(config.patterns.iter().all(|p| p.enabled));
        assert!(!config.enable_logging);
        assert_eq!(config.sweep_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_config("[1, 2]"), Err(ConfigError::NotAnObject)));
        assert!(matches!(parse_config("{"), Err(ConfigError::Json(_))));
        assert!(matches!(parse_config(r#"{"patterns": [42]}"#), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_lenient_absent_or_malformed() {
        assert_eq!(config_from_value(None), EngineConfig::default());
        assert_eq!(config_from_value(Some(&Value::Null)), EngineConfig::default());
        assert!(config_from_value(Some(&json!({"enableLogging": true}))).patterns.is_empty());
        assert!(config_from_value(Some(&json!({"patterns": "nope"}))).patterns.is_empty());
    }

    #[test]
    fn test_lenient_skips_bad_entries() {
        let config = config_from_value(Some(&json!({
            "patterns": [42, {"enabled": true}, "^_ga_", {"pattern": "^x", "enabled": "1"}],
            "enableLogging": 1
        })));
        assert_eq!(
            config.patterns,
            vec![PatternEntry::new("^_ga_", true), PatternEntry::new("^x", true)]
        );
        assert!(config.enable_logging);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!("0")));
        assert!(!is_truthy(&json!("false")));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!(2)));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_null_patterns_mean_inactive() {
        let config = parse_config(r#"{"patterns": null, "enableLogging": true}"#).unwrap();
        assert!(config.patterns.is_empty());
        assert!(config.enable_logging);

        let config = parse_config(r#"{"sweepIntervalMs": null}"#).unwrap();
        assert!(config.patterns.is_empty());
        assert_eq!(config.sweep_interval, DEFAULT_SWEEP_INTERVAL);
    }
}
