use std::env;
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

// ── Server config ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP bridge binds to.
    pub bind_addr: String,
    /// API key required in the `x-api-key` header on every request.
    /// Empty string disables the auth gate entirely (trusted LAN setups).
    /// Overridden at runtime by the `JOULE_API_KEY` environment variable.
    pub api_key: String,
    /// Allow cross-origin requests from the HMI dev server.
    pub permissive_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8321".to_string(),
            api_key: String::new(),
            permissive_cors: true,
        }
    }
}

// ── Memory config ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Path of the persisted memory document (goals, facts, settings snapshot).
    pub file_path: String,
    /// Seconds between best-effort durable flushes of dirty memory state.
    pub flush_interval_secs: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            file_path: ".joule/memory.json".to_string(),
            flush_interval_secs: 30,
        }
    }
}

// ── Assistant config ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub name: String,
    /// Home city used as the cost-estimate fallback when neither the
    /// utterance nor the conversational context names one.
    pub home_city: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: "Joule".to_string(),
            home_city: String::new(),
        }
    }
}

// ── Top-level config ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub memory: MemoryConfig,
    pub assistant: AssistantConfig,
}

impl AppConfig {
    /// Load config from a TOML file, falling back to defaults when the file
    /// does not exist.  Environment overrides are applied after the file is
    /// parsed so they always win.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let raw = fs::read_to_string(path)?;
            toml::from_str(&raw)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = env::var("JOULE_API_KEY") {
            self.server.api_key = key;
        }
        if let Ok(addr) = env::var("JOULE_BIND_ADDR") {
            if !addr.trim().is_empty() {
                self.server.bind_addr = addr;
            }
        }
    }

    /// `Some(key)` when the API-key gate is active, `None` when disabled.
    pub fn required_api_key(&self) -> Option<&str> {
        let key = self.server.api_key.trim();
        if key.is_empty() { None } else { Some(key) }
    }
}
