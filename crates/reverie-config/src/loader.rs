// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./reverie.toml` > `~/.config/reverie/reverie.toml`
//! > `/etc/reverie/reverie.toml` with environment variable overrides via the
//! `REVERIE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ReverieConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/reverie/reverie.toml` (system-wide)
/// 3. `~/.config/reverie/reverie.toml` (user XDG config)
/// 4. `./reverie.toml` (local directory)
/// 5. `REVERIE_*` environment variables
pub fn load_config() -> Result<ReverieConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReverieConfig::default()))
        .merge(Toml::file("/etc/reverie/reverie.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("reverie/reverie.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("reverie.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ReverieConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReverieConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ReverieConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReverieConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `REVERIE_RETRIEVAL_HISTORY_WINDOW` must
/// map to `retrieval.history_window`, not `retrieval.history.window`.
fn env_provider() -> Env {
    Env::prefixed("REVERIE_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("retrieval_", "retrieval.", 1)
            .replacen("distill_", "distill.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults_from_empty_string() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.agent.name, "reverie");
        assert_eq!(config.retrieval.assist_max_artifacts, 3);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [retrieval]
            assist_min_confidence = 0.5
            history_window = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.retrieval.assist_min_confidence, 0.5);
        assert_eq!(config.retrieval.history_window, 8);
        // Untouched keys keep their defaults.
        assert_eq!(config.retrieval.precision_min_confidence, 0.85);
    }

    #[test]
    fn invalid_toml_reports_error() {
        let result = load_config_from_str("[retrieval]\nhistory_window = \"many\"");
        assert!(result.is_err());
    }
}
