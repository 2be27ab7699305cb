use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::insights::{
    FallbackConfig, HeadlinePatternConfig, KeywordConfig, LengthBandConfig, ToneConfig,
    VolumeConfig,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub timeout_ms: u64,
    pub max_variations: usize,
    pub temperature: f64,
    /// USD per 1k prompt tokens.
    pub input_cost_per_1k: f64,
    /// USD per 1k completion tokens.
    pub output_cost_per_1k: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_variations: 5,
            temperature: 0.7,
            input_cost_per_1k: 0.00015,
            output_cost_per_1k: 0.0006,
        }
    }
}

impl GenerationConfig {
    pub fn cost(&self, prompt_tokens: u32, completion_tokens: u32) -> f64 {
        (prompt_tokens as f64 / 1000.0) * self.input_cost_per_1k
            + (completion_tokens as f64 / 1000.0) * self.output_cost_per_1k
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/adcopy.json"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    pub headline: HeadlinePatternConfig,
    pub tone: ToneConfig,
    pub length: LengthBandConfig,
    pub keywords: KeywordConfig,
    pub volume: VolumeConfig,
    pub fallback: FallbackConfig,
    pub generation: GenerationConfig,
    pub store: StoreConfig,
}

impl InsightsConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), String> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| format!("failed to read config: {}", err))?;
                toml::from_str(&contents)
                    .map_err(|err| format!("failed to parse config: {}", err))?
            } else {
                InsightsConfig::default()
            }
        } else {
            InsightsConfig::default()
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|err| format!("failed to create config dir: {}", err))?;
            }
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| format!("failed to serialize config: {}", err))?;
        std::fs::write(path, payload)
            .map_err(|err| format!("failed to write config: {}", err))?;
        Ok(())
    }

    /// Writes the built-in defaults; config files and env overrides are ignored.
    pub fn write_default(path: &Path) -> Result<(), String> {
        InsightsConfig::default().write(path)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = env::var("INSIGHTS_STORE_PATH") {
            if !path.trim().is_empty() {
                self.store.path = PathBuf::from(path);
            }
        }
        if let Ok(timeout) = env::var("LLM_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.generation.timeout_ms = value;
            }
        }
        if let Ok(cost) = env::var("LLM_INPUT_COST_PER_1K") {
            if let Ok(value) = cost.parse::<f64>() {
                self.generation.input_cost_per_1k = value;
            }
        }
        if let Ok(cost) = env::var("LLM_OUTPUT_COST_PER_1K") {
            if let Ok(value) = cost.parse::<f64>() {
                self.generation.output_cost_per_1k = value;
            }
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    env::var("INSIGHTS_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/insights.toml")))
}
