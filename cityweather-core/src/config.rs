use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use crate::provider::ProviderId;

/// Configuration for a single provider (API key and optional endpoint override).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,

    /// Overrides the provider's public endpoint, mainly for proxies and tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Time budgets and limits for the places browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacesSettings {
    #[serde(default = "default_sdk_load_timeout")]
    pub sdk_load_timeout_secs: u64,

    /// Budget for the whole pipeline; placeholders are shown once it elapses.
    #[serde(default = "default_fallback_timeout")]
    pub fallback_timeout_secs: u64,

    #[serde(default = "default_nearby_search_timeout")]
    pub nearby_search_timeout_secs: u64,

    #[serde(default = "default_details_timeout")]
    pub details_timeout_secs: u64,

    #[serde(default = "default_search_radius")]
    pub search_radius_m: u32,

    /// Upper bound on places enriched with a detail lookup.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_placeholder_count")]
    pub placeholder_count: usize,
}

const fn default_sdk_load_timeout() -> u64 {
    10
}

const fn default_fallback_timeout() -> u64 {
    15
}

const fn default_nearby_search_timeout() -> u64 {
    7
}

const fn default_details_timeout() -> u64 {
    5
}

const fn default_search_radius() -> u32 {
    5000
}

const fn default_max_results() -> usize {
    20
}

const fn default_placeholder_count() -> usize {
    10
}

impl Default for PlacesSettings {
    fn default() -> Self {
        Self {
            sdk_load_timeout_secs: default_sdk_load_timeout(),
            fallback_timeout_secs: default_fallback_timeout(),
            nearby_search_timeout_secs: default_nearby_search_timeout(),
            details_timeout_secs: default_details_timeout(),
            search_radius_m: default_search_radius(),
            max_results: default_max_results(),
            placeholder_count: default_placeholder_count(),
        }
    }
}

impl PlacesSettings {
    pub fn sdk_load_timeout(&self) -> Duration {
        Duration::from_secs(self.sdk_load_timeout_secs)
    }

    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_secs(self.fallback_timeout_secs)
    }

    pub fn nearby_search_timeout(&self) -> Duration {
        Duration::from_secs(self.nearby_search_timeout_secs)
    }

    pub fn details_timeout(&self) -> Duration {
        Duration::from_secs(self.details_timeout_secs)
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub places: PlacesSettings,
}

impl Config {
    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Load config from disk, then apply API keys found in the environment.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from disk only, or return an empty default if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "cityweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Keys from the environment win over the file. Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for id in ProviderId::all() {
            let Some(key) = lookup(id.env_var()).filter(|k| !k.trim().is_empty()) else {
                continue;
            };

            tracing::debug!(provider = %id, "using API key from {}", id.env_var());
            self.upsert_provider_api_key(*id, key);
        }
    }

    /// Set or replace a provider API key, keeping any endpoint override.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers
            .entry(provider_id.as_str().to_string())
            .and_modify(|cfg| cfg.api_key = api_key.clone())
            .or_insert(ProviderConfig { api_key, base_url: None });
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id).map(|cfg| cfg.api_key.as_str())
    }

    pub fn provider_base_url(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id).and_then(|cfg| cfg.base_url.as_deref())
    }
}
