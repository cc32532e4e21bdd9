//! Architect configuration with documented constants
//!
//! Values come from three layers, later layers winning:
//! built-in defaults, an optional TOML file, then environment variables
//! for the LLM endpoint (`LLM_API_KEY`, `LLM_API_URL`, `LLM_MODEL`).

use crate::core::error::{ArchError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the architect loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchitectConfig {
    // === PACING ===
    /// Delay between reasoning-step log entries (milliseconds)
    ///
    /// Purely cosmetic. Set to 0 for headless runs and tests.
    pub reasoning_step_delay_ms: u64,

    /// Delay between ticks in auto mode (milliseconds)
    pub auto_tick_delay_ms: u64,

    // === MOVEMENT ===
    /// Maximum offset on x and z when a MOVE arrives without a target
    pub move_jitter: f32,

    // === PROMPT SIZE ===
    /// Most recent objects listed in the prompt
    ///
    /// Older objects still count towards stats and nearest-neighbour scans,
    /// they are only left out of the listing.
    pub prompt_object_limit: usize,

    /// Most recent knowledge titles listed in the prompt
    pub prompt_knowledge_limit: usize,

    /// Half-width of the terrain sample grid around the agent (world units)
    pub terrain_sample_radius: f32,

    /// Spacing between terrain samples (world units)
    ///
    /// With radius 4 and step 2 the prompt carries a 5x5 grid.
    pub terrain_sample_step: f32,

    // === RANDOMNESS ===
    /// Seed for MOVE jitter
    pub seed: u64,

    /// LLM endpoint settings
    pub llm: LlmConfig,
}

/// Connection settings for the decision LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key (empty means every decision falls back to WAIT)
    #[serde(skip_serializing)]
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: "https://api.anthropic.com/v1/messages".into(),
            model: "claude-3-haiku-20240307".into(),
            max_tokens: 2048,
        }
    }
}

impl Default for ArchitectConfig {
    fn default() -> Self {
        Self {
            reasoning_step_delay_ms: 400,
            auto_tick_delay_ms: 3000,

            move_jitter: 2.0,

            prompt_object_limit: 20,
            prompt_knowledge_limit: 10,
            terrain_sample_radius: 4.0,
            terrain_sample_step: 2.0,

            seed: 42,

            llm: LlmConfig::default(),
        }
    }
}

impl ArchitectConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; missing fields keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override LLM settings from `LLM_API_KEY`, `LLM_API_URL` and `LLM_MODEL`
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            self.llm.api_key = key;
        }
        if let Ok(url) = std::env::var("LLM_API_URL") {
            self.llm.api_url = url;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            self.llm.model = model;
        }
    }

    pub fn reasoning_step_delay(&self) -> Duration {
        Duration::from_millis(self.reasoning_step_delay_ms)
    }

    pub fn auto_tick_delay(&self) -> Duration {
        Duration::from_millis(self.auto_tick_delay_ms)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.move_jitter.is_finite() && self.move_jitter >= 0.0) {
            return Err(ArchError::ConfigError(format!(
                "move_jitter ({}) must be a non-negative number",
                self.move_jitter
            )));
        }

        if !(self.terrain_sample_step > 0.0) {
            return Err(ArchError::ConfigError(format!(
                "terrain_sample_step ({}) must be positive",
                self.terrain_sample_step
            )));
        }

        // Keeps the sample grid small enough for a prompt
        if self.terrain_sample_radius / self.terrain_sample_step > 8.0 {
            return Err(ArchError::ConfigError(format!(
                "terrain_sample_radius ({}) allows at most 8 steps of {}",
                self.terrain_sample_radius, self.terrain_sample_step
            )));
        }

        if self.llm.max_tokens == 0 {
            return Err(ArchError::ConfigError("llm.max_tokens must be positive".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ArchitectConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ArchitectConfig::from_toml_str(
            r#"
            reasoning_step_delay_ms = 0
            seed = 7

            [llm]
            model = "deepseek-chat"
            "#,
        )
        .unwrap();

        assert_eq!(config.reasoning_step_delay_ms, 0);
        assert_eq!(config.seed, 7);
        assert_eq!(config.llm.model, "deepseek-chat");
        assert_eq!(config.auto_tick_delay_ms, 3000);
        assert_eq!(config.llm.max_tokens, 2048);
    }

    #[test]
    fn test_invalid_step_rejected() {
        let result = ArchitectConfig::from_toml_str("terrain_sample_step = 0.0");
        assert!(matches!(result, Err(ArchError::ConfigError(_))));
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let result = ArchitectConfig::from_toml_str(
            "terrain_sample_radius = 40.0\nterrain_sample_step = 1.0",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let result = ArchitectConfig::from_toml_str("seed = \"many\"");
        assert!(matches!(result, Err(ArchError::TomlError(_))));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut config = ArchitectConfig::default();
        config.llm.api_key = "secret".into();
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("secret"));
    }

    #[test]
    fn test_env_overrides_toml() {
        let mut config = ArchitectConfig::from_toml_str(
            r#"
            [llm]
            api_url = "https://toml.example/v1/messages"
            model = "toml-model"
            "#,
        )
        .unwrap();

        std::env::set_var("LLM_API_KEY", "env-key");
        std::env::set_var("LLM_API_URL", "https://env.example/v1/chat/completions");
        std::env::set_var("LLM_MODEL", "env-model");
        config.apply_env();
        std::env::remove_var("LLM_API_KEY");
        std::env::remove_var("LLM_API_URL");
        std::env::remove_var("LLM_MODEL");

        assert_eq!(config.llm.api_key, "env-key");
        assert_eq!(config.llm.api_url, "https://env.example/v1/chat/completions");
        assert_eq!(config.llm.model, "env-model");
        assert_eq!(config.llm.max_tokens, 2048);
    }

    #[test]
    fn test_delays() {
        let config = ArchitectConfig::default();
        assert_eq!(config.reasoning_step_delay(), Duration::from_millis(400));
        assert_eq!(config.auto_tick_delay(), Duration::from_secs(3));
    }
}
