//! Application configuration for kubeintent.
//!
//! User config lives at `~/.kubeintent/kubeintent.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{KubeIntentError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "kubeintent.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".kubeintent";

// ---------------------------------------------------------------------------
// Config structs (matching kubeintent.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Agent HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Reasoning engine settings (used by `prompt`).
    #[serde(default)]
    pub engine: EngineConfig,

    /// Where `prompt` forwards assembled documents.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Cluster session settings.
    #[serde(default)]
    pub cluster: ClusterConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address for the agent.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".into()
}

/// `[engine]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the reasoning engine (Ollama-compatible).
    #[serde(default = "default_engine_url")]
    pub url: String,

    /// Model to prompt.
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: default_engine_url(),
            model: default_model(),
        }
    }
}

fn default_engine_url() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "llama3.2".into()
}

/// `[agent]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base URL of a running agent.
    #[serde(default = "default_agent_url")]
    pub url: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            url: default_agent_url(),
        }
    }
}

fn default_agent_url() -> String {
    "http://localhost:8080".into()
}

/// `[cluster]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Explicit kubeconfig path. When unset, in-cluster config is tried
    /// first, then `~/.kube/config`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<String>,

    /// Kubeconfig context to use instead of the current one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Field manager recorded on server-side applies.
    #[serde(default = "default_field_manager")]
    pub field_manager: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            context: None,
            field_manager: default_field_manager(),
        }
    }
}

fn default_field_manager() -> String {
    "kubeintent".into()
}

// ---------------------------------------------------------------------------
// Bridge config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime bridge configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Reasoning engine base URL.
    pub engine_url: Url,
    /// Model to prompt.
    pub model: String,
    /// Agent base URL.
    pub agent_url: Url,
}

impl TryFrom<&AppConfig> for BridgeConfig {
    type Error = KubeIntentError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            engine_url: parse_url("engine.url", &config.engine.url)?,
            model: config.engine.model.clone(),
            agent_url: parse_url("agent.url", &config.agent.url)?,
        })
    }
}

/// Parse a URL-valued setting, naming the setting on failure.
pub fn parse_url(setting: &str, value: &str) -> Result<Url> {
    Url::parse(value)
        .map_err(|e| KubeIntentError::config(format!("invalid {setting} '{value}': {e}")))
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.kubeintent/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| KubeIntentError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.kubeintent/kubeintent.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| KubeIntentError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        KubeIntentError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| KubeIntentError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| KubeIntentError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| KubeIntentError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
