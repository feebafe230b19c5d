// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values that TOML
//! typing alone cannot express.

use thiserror::Error;

use crate::model::ReverieConfig;

/// A single configuration validation failure.
#[derive(Debug, Clone, Error)]
#[error("config error at `{field}`: {message}")]
pub struct ConfigError {
    /// Dotted path of the offending key.
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a loaded configuration, collecting every failure rather than
/// stopping at the first.
pub fn validate_config(config: &ReverieConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    check_confidence(
        &mut errors,
        "retrieval.precision_min_confidence",
        config.retrieval.precision_min_confidence,
    );
    check_confidence(
        &mut errors,
        "retrieval.assist_min_confidence",
        config.retrieval.assist_min_confidence,
    );

    if config.retrieval.precision_min_confidence < config.retrieval.assist_min_confidence {
        errors.push(ConfigError::new(
            "retrieval.precision_min_confidence",
            "precision threshold must not be below the assist threshold",
        ));
    }

    if config.retrieval.precision_max_artifacts == 0 {
        errors.push(ConfigError::new(
            "retrieval.precision_max_artifacts",
            "must be at least 1",
        ));
    }
    if config.retrieval.assist_max_artifacts == 0 {
        errors.push(ConfigError::new(
            "retrieval.assist_max_artifacts",
            "must be at least 1",
        ));
    }
    if config.retrieval.context_char_budget < 256 {
        errors.push(ConfigError::new(
            "retrieval.context_char_budget",
            "budget below 256 chars cannot hold a single artifact header",
        ));
    }
    if config.distill.concurrency == 0 {
        errors.push(ConfigError::new("distill.concurrency", "must be at least 1"));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::new(
            "agent.log_level",
            format!(
                "unknown level `{}` (expected one of: {})",
                config.agent.log_level,
                valid_levels.join(", ")
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_confidence(errors: &mut Vec<ConfigError>, field: &str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ConfigError::new(
            field,
            format!("confidence must be within [0, 1], got {value}"),
        ));
    }
}
