// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Reverie.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Reverie configuration.
///
/// Loaded from TOML files with environment variable overrides. All sections
/// are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReverieConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Memory retrieval settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Distillation batch settings.
    #[serde(default)]
    pub distill: DistillConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the service.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "reverie".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Memory retrieval configuration.
///
/// The two calling conventions (precision and assist) share one core
/// algorithm parameterized by threshold and count.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Minimum confidence for the high-precision convention.
    #[serde(default = "default_precision_min_confidence")]
    pub precision_min_confidence: f64,

    /// Maximum artifacts returned by the high-precision convention.
    #[serde(default = "default_precision_max_artifacts")]
    pub precision_max_artifacts: usize,

    /// Minimum confidence for the looser assist convention.
    #[serde(default = "default_assist_min_confidence")]
    pub assist_min_confidence: f64,

    /// Maximum artifacts returned by the assist convention.
    #[serde(default = "default_assist_max_artifacts")]
    pub assist_max_artifacts: usize,

    /// Number of recent history messages folded into the query.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Most recent entries rendered per artifact in the context block.
    #[serde(default = "default_entries_per_artifact")]
    pub entries_per_artifact: usize,

    /// Hard character budget for the injected context block.
    #[serde(default = "default_context_char_budget")]
    pub context_char_budget: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            precision_min_confidence: default_precision_min_confidence(),
            precision_max_artifacts: default_precision_max_artifacts(),
            assist_min_confidence: default_assist_min_confidence(),
            assist_max_artifacts: default_assist_max_artifacts(),
            history_window: default_history_window(),
            entries_per_artifact: default_entries_per_artifact(),
            context_char_budget: default_context_char_budget(),
        }
    }
}

fn default_precision_min_confidence() -> f64 {
    0.85
}

fn default_precision_max_artifacts() -> usize {
    2
}

fn default_assist_min_confidence() -> f64 {
    0.6
}

fn default_assist_max_artifacts() -> usize {
    3
}

fn default_history_window() -> usize {
    4
}

fn default_entries_per_artifact() -> usize {
    5
}

fn default_context_char_budget() -> usize {
    4000
}

/// Distillation batch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DistillConfig {
    /// Enable the distillation entry point.
    #[serde(default = "default_distill_enabled")]
    pub enabled: bool,

    /// Maximum insight statements appended per user per run.
    #[serde(default = "default_max_insights")]
    pub max_insights: usize,

    /// Bounded per-user concurrency for the batch run.
    #[serde(default = "default_distill_concurrency")]
    pub concurrency: usize,
}

impl Default for DistillConfig {
    fn default() -> Self {
        Self {
            enabled: default_distill_enabled(),
            max_insights: default_max_insights(),
            concurrency: default_distill_concurrency(),
        }
    }
}

fn default_distill_enabled() -> bool {
    true
}

fn default_max_insights() -> usize {
    5
}

fn default_distill_concurrency() -> usize {
    4
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8787
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_thresholds() {
        let config = ReverieConfig::default();
        assert_eq!(config.retrieval.precision_min_confidence, 0.85);
        assert_eq!(config.retrieval.precision_max_artifacts, 2);
        assert_eq!(config.retrieval.assist_min_confidence, 0.6);
        assert_eq!(config.retrieval.assist_max_artifacts, 3);
        assert_eq!(config.retrieval.context_char_budget, 4000);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r#"
            [retrieval]
            precision_min_confidence = 0.9
            typo_field = 1
        "#;
        let parsed: Result<ReverieConfig, _> = toml::from_str(toml);
        assert!(parsed.is_err(), "unknown key must be rejected");
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let toml = r#"
            [gateway]
            port = 9000
        "#;
        let parsed: ReverieConfig = toml::from_str(toml).unwrap();
        assert_eq!(parsed.gateway.port, 9000);
        assert_eq!(parsed.gateway.host, "127.0.0.1");
        assert_eq!(parsed.distill.max_insights, 5);
    }
}
