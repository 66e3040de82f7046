//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use veritag_verification::{CheckPolicy, CollectionLimits};

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for a VeriTag node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Address the HTTP API listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Base URL of the ledger gateway. Without it ledger evidence is
    /// indeterminate.
    #[serde(default)]
    pub ledger_url: Option<String>,

    /// Base URL of the content store. Without it content evidence is
    /// indeterminate.
    #[serde(default)]
    pub content_store_url: Option<String>,

    /// JSON file with the products and manufacturers to serve.
    #[serde(default)]
    pub registry_seed: Option<PathBuf>,

    /// Timeout for each evidence check, in milliseconds.
    #[serde(default = "default_check_timeout_ms")]
    pub check_timeout_ms: u64,

    /// Deadline for collecting all evidence, in milliseconds.
    #[serde(default = "default_collection_deadline_ms")]
    pub collection_deadline_ms: u64,

    /// Whether finished verifications are written to the ledger.
    #[serde(default = "default_true")]
    pub anchor_on_ledger: bool,

    /// Whether to expose the Prometheus `/metrics` endpoint.
    #[serde(default = "default_true")]
    pub enable_metrics: bool,

    /// Thresholds for the individual checks.
    #[serde(default)]
    pub policy: CheckPolicy,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_bind_addr() -> String {
    "127.0.0.1:7080".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_check_timeout_ms() -> u64 {
    2_000
}

fn default_collection_deadline_ms() -> u64 {
    5_000
}

fn default_true() -> bool {
    true
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Reject settings that would make every verification meaningless.
    pub fn validate(&self) -> Result<(), NodeError> {
        if self.check_timeout_ms == 0 || self.collection_deadline_ms == 0 {
            return Err(NodeError::Config(
                "check_timeout_ms and collection_deadline_ms must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.policy.counterfeit_ratio_warn) {
            return Err(NodeError::Config(
                "policy.counterfeit_ratio_warn must lie in [0, 1]".into(),
            ));
        }
        self.log_format()?;
        Ok(())
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_millis(self.check_timeout_ms)
    }

    pub fn collection_limits(&self) -> CollectionLimits {
        CollectionLimits {
            check_timeout: self.check_timeout(),
            collection_deadline: Duration::from_millis(self.collection_deadline_ms),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            ledger_url: None,
            content_store_url: None,
            registry_seed: None,
            check_timeout_ms: default_check_timeout_ms(),
            collection_deadline_ms: default_collection_deadline_ms(),
            anchor_on_ledger: default_true(),
            enable_metrics: default_true(),
            policy: CheckPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.bind_addr, config.bind_addr);
        assert_eq!(parsed.policy, config.policy);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.check_timeout_ms, 2_000);
        assert_eq!(config.collection_deadline_ms, 5_000);
        assert_eq!(config.log_format, "human");
        assert!(config.anchor_on_ledger);
        assert_eq!(config.policy.excessive_attempts, 20);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            ledger_url = "http://ledger.local:8545"
            check_timeout_ms = 500

            [policy]
            max_batch_siblings = 3
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.ledger_url.as_deref(), Some("http://ledger.local:8545"));
        assert_eq!(config.collection_limits().check_timeout, Duration::from_millis(500));
        assert_eq!(config.policy.max_batch_siblings, 3);
        assert_eq!(config.policy.pattern_window_days, 30); // default
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(NodeConfig::from_toml_str("check_timeout_ms = 0").is_err());
        assert!(NodeConfig::from_toml_str("log_format = \"xml\"").is_err());
        assert!(
            NodeConfig::from_toml_str("[policy]\ncounterfeit_ratio_warn = 1.5").is_err()
        );
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_addr = \"0.0.0.0:9000\"").unwrap();
        let config = NodeConfig::from_toml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = NodeConfig::from_toml_file("/nonexistent/veritag.toml");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }
}
