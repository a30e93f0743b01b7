//! Engine configuration loaded from TOML
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration:
//!
//! ```toml
//! script_name = "main.jul"
//! module = "default"
//!
//! [cancellation]
//! expression_batch = 128
//! empty_statement_batch = 1024
//! check_interval_ms = 500
//! expression_ceiling = 8192
//!
//! [limits]
//! max_call_depth = 256
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How often executing code polls its thread's cancellation flag
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CancellationConfig {
    /// Expression statements counted before the clock is consulted
    pub expression_batch: u32,
    /// Empty statements counted before the flag is consulted
    pub empty_statement_batch: u32,
    /// Minimum time between flag checks, in milliseconds
    pub check_interval_ms: u64,
    /// Expression count after which the flag is checked regardless of time
    pub expression_ceiling: u64,
}

impl Default for CancellationConfig {
    fn default() -> Self {
        Self {
            expression_batch: 128,
            empty_statement_batch: 1024,
            check_interval_ms: 500,
            expression_ceiling: 8192,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Nested function calls allowed before `System.StackOverflowException`
    pub max_call_depth: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_call_depth: 256 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// File name attached to exception source info
    pub script_name: String,
    /// Module that script-declared types belong to
    pub module: String,
    pub cancellation: CancellationConfig,
    pub limits: LimitsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            script_name: "<script>".to_string(),
            module: "default".to_string(),
            cancellation: CancellationConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("parsing engine configuration")
    }

    /// Load configuration from a TOML file, or fall back to defaults when absent
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading configuration from {}", path.display()))?;
        toml::from_str(&data)
            .with_context(|| format!("parsing configuration {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            script_name = "loop.jul"

            [cancellation]
            expression_batch = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.script_name, "loop.jul");
        assert_eq!(config.module, "default");
        assert_eq!(config.cancellation.expression_batch, 1);
        assert_eq!(config.cancellation.empty_statement_batch, 1024);
        assert_eq!(config.limits.max_call_depth, 256);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = EngineConfig::from_toml_str("limits = 3").unwrap_err();
        assert!(err.to_string().contains("parsing engine configuration"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load(&dir.path().join("engine.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        fs::write(&path, "[limits]\nmax_call_depth = 16\n").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.limits.max_call_depth, 16);
    }
}
