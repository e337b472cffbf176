//! Configuration management
//!
//! Manages tutor configuration: data file locations, the text-generation
//! backend and the HTTP server.

use anyhow::{Result, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::generation::{DEFAULT_MAX_NEW_TOKENS, DEFAULT_TEMPERATURE};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Knowledge and scenario data files
    #[serde(default)]
    pub data: DataConfig,
    /// Text-generation backend settings
    #[serde(default)]
    pub generation: GenerationConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON array of `{ "text": ... }` records
    #[serde(default = "default_knowledge_path")]
    pub knowledge_path: PathBuf,
    /// JSON array of `{ "scenario": ... }` records
    #[serde(default = "default_scenarios_path")]
    pub scenarios_path: PathBuf,
}

fn default_knowledge_path() -> PathBuf {
    PathBuf::from("data/knowledge_chunks.json")
}

fn default_scenarios_path() -> PathBuf {
    PathBuf::from("data/scenarios.json")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            knowledge_path: default_knowledge_path(),
            scenarios_path: default_scenarios_path(),
        }
    }
}

/// Which wire protocol the generation server speaks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Hugging Face text-generation-inference / Inference API
    #[default]
    Hf,
    /// Local Ollama server
    Ollama,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Hf => write!(f, "hf"),
            Backend::Ollama => write!(f, "ollama"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub backend: Backend,
    /// Base URL of the generation server
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model identifier (sent to Ollama; informational for TGI)
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// HTTP timeout for a single generation call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Remove the echoed prompt from generated text before display
    #[serde(default = "default_true")]
    pub strip_prompt_echo: bool,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8081".to_string()
}

fn default_model() -> String {
    "Qwen/Qwen2.5-0.5B-Instruct".to_string()
}

fn default_max_new_tokens() -> u32 {
    DEFAULT_MAX_NEW_TOKENS
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_true() -> bool {
    true
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            endpoint: default_endpoint(),
            model: default_model(),
            max_new_tokens: default_max_new_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            strip_prompt_echo: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Sessions idle longer than this are evicted
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_session_idle_minutes() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_idle_minutes: default_session_idle_minutes(),
        }
    }
}

impl ServerConfig {
    /// Idle timeout as a duration; huge values saturate instead of overflowing
    pub fn session_idle(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_idle_minutes.saturating_mul(60))
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the project config file is
    /// used when present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let config_path = config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            Ok(Config::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("org", "sustain-tutor", "sustain-tutor")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// Show the effective configuration
pub fn show_config(config: &Config) -> Result<()> {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("     Sustain Tutor Configuration");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    println!("📚 Knowledge file:  {}", config.data.knowledge_path.display());
    println!("🏢 Scenario file:   {}", config.data.scenarios_path.display());
    println!();
    println!("🤖 Backend:         {} ({})", config.generation.backend, config.generation.endpoint);
    println!("   Model:           {}", config.generation.model);
    println!("   Max new tokens:  {}", config.generation.max_new_tokens);
    println!("   Temperature:     {}", config.generation.temperature);
    println!("   Timeout:         {}s", config.generation.timeout_secs);
    println!("   Strip echo:      {}", if config.generation.strip_prompt_echo { "yes" } else { "no" });
    println!();
    println!("🌐 Server:          {}:{}", config.server.host, config.server.port);
    println!("   Session idle:    {} min", config.server.session_idle_minutes);

    if let Ok(path) = config_path() {
        println!("\n💡 Config file location: {}", path.display());
    }

    Ok(())
}

/// Write the default configuration to the project config path
pub fn init_config() -> Result<PathBuf> {
    let path = config_path()?;
    if path.exists() {
        anyhow::bail!("Config file already exists: {}", path.display());
    }
    Config::default().save_to(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_generation_constants() {
        let config = Config::default();
        assert_eq!(config.generation.max_new_tokens, 250);
        assert!((config.generation.temperature - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.generation.backend, Backend::Hf);
        assert!(config.generation.strip_prompt_echo);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml_str = r#"
[generation]
backend = "ollama"
endpoint = "http://localhost:11434"
temperature = 0.2

[server]
port = 9000
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.generation.backend, Backend::Ollama);
        assert_eq!(config.generation.endpoint, "http://localhost:11434");
        assert_eq!(config.generation.max_new_tokens, 250);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.data, DataConfig::default());
    }

    #[test]
    fn test_save_and_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.data.knowledge_path = PathBuf::from("/srv/tutor/knowledge.json");
        config.generation.max_new_tokens = 400;
        config.save_to(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("absent.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_session_idle_saturates() {
        let mut server = ServerConfig::default();
        assert_eq!(server.session_idle(), std::time::Duration::from_secs(30 * 60));

        server.session_idle_minutes = u64::MAX;
        assert_eq!(server.session_idle(), std::time::Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_default_config_survives_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
