
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::chatbot::DEFAULT_HISTORY_TURNS;
use crate::search::DEFAULT_TOP_K;

pub const DEFAULT_EMBEDDING_DIMENSION: u32 = 1536;
pub const DEFAULT_INDEX_NAME: &str = "product-recommendations";
pub const DEFAULT_PINECONE_CONTROLLER: &str = "https://api.pinecone.io";

const APP_DIR_NAME: &str = "product-advisor";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub pinecone: PineconeConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Azure OpenAI chat deployment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            deployment: String::new(),
            api_version: "2023-12-01-preview".to_string(),
            temperature: 0.7,
        }
    }
}

/// Azure OpenAI embedding deployment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub api_version: String,
    pub dimension: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            model: String::new(),
            api_version: "2024-07-01-preview".to_string(),
            dimension: DEFAULT_EMBEDDING_DIMENSION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PineconeConfig {
    pub api_key: String,
    /// Region the serverless index is created in
    pub environment: String,
    pub cloud: String,
    pub index_name: String,
    pub controller_url: String,
    pub top_k: usize,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            environment: "us-east-1".to_string(),
            cloud: "aws".to_string(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            controller_url: DEFAULT_PINECONE_CONTROLLER.to_string(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChatConfig {
    /// Past turns replayed to the model when composing a reply
    pub history_turns: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_turns: DEFAULT_HISTORY_TURNS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Missing required setting: {0}")]
    MissingValue(&'static str),
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid temperature: {0} (must be between 0.0 and 2.0)")]
    InvalidTemperature(f32),
    #[error("Invalid embedding dimension: {0} (must be between 64 and 4096)")]
    InvalidEmbeddingDimension(u32),
    #[error("Invalid top_k: {0} (must be between 1 and 100)")]
    InvalidTopK(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Config {
    /// Load the file from `config_dir`, falling back to defaults when it does not exist.
    ///
    /// The result is not validated; required secrets usually come from the
    /// environment, see [`Config::apply_env`].
    #[inline]
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(Self {
                base_dir: config_dir.as_ref().to_path_buf(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        Ok(config)
    }

    /// File settings overlaid with process environment variables, validated.
    ///
    /// This is what every command that talks to a hosted service uses, so a
    /// missing key fails here rather than on the first request.
    #[inline]
    pub fn load_effective() -> Result<Self> {
        let mut config = Self::load(Self::config_dir()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        config
            .validate()
            .context("Configuration validation failed")?;
        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        let config_dir = self.get_base_dir();

        fs::create_dir_all(config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        let config_path = self.config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Default configuration directory for this user
    #[inline]
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(ConfigError::DirectoryError)
    }

    #[inline]
    pub fn get_base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.get_base_dir().join(CONFIG_FILE_NAME)
    }

    /// Overlay values from environment-style variables.
    ///
    /// Unset or blank variables leave the current value untouched.
    #[inline]
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let overrides: [(&str, &mut String); 10] = [
            ("AZURE_OPENAI_ENDPOINT", &mut self.llm.endpoint),
            ("AZURE_OPENAI_API_KEY", &mut self.llm.api_key),
            ("AZURE_OPENAI_DEPLOYMENT_NAME", &mut self.llm.deployment),
            ("AZURE_OPENAI_API_VERSION", &mut self.llm.api_version),
            ("AZURE_EMBEDDING_ENDPOINT", &mut self.embedding.endpoint),
            ("AZURE_EMBEDDING_API_KEY", &mut self.embedding.api_key),
            ("AZURE_EMBEDDING_MODEL", &mut self.embedding.model),
            ("PINECONE_API_KEY", &mut self.pinecone.api_key),
            ("PINECONE_ENVIRONMENT", &mut self.pinecone.environment),
            ("PINECONE_INDEX_NAME", &mut self.pinecone.index_name),
        ];

        for (key, slot) in overrides {
            if let Some(value) = get(key) {
                *slot = value;
            }
        }
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.llm.validate()?;
        self.embedding.validate()?;
        self.pinecone.validate()?;
        Ok(())
    }
}

fn require(value: &str, key: &'static str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingValue(key));
    }
    Ok(())
}

fn parse_http_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|_| ConfigError::InvalidUrl(value.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(value.to_string()));
    }
    Ok(url)
}

impl LlmConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(&self.endpoint, "AZURE_OPENAI_ENDPOINT")?;
        require(&self.api_key, "AZURE_OPENAI_API_KEY")?;
        require(&self.deployment, "AZURE_OPENAI_DEPLOYMENT_NAME")?;
        require(&self.api_version, "AZURE_OPENAI_API_VERSION")?;
        parse_http_url(&self.endpoint)?;

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }

        Ok(())
    }

    #[inline]
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        parse_http_url(&self.endpoint)
    }
}

impl EmbeddingConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(&self.endpoint, "AZURE_EMBEDDING_ENDPOINT")?;
        require(&self.api_key, "AZURE_EMBEDDING_API_KEY")?;
        require(&self.model, "AZURE_EMBEDDING_MODEL")?;
        parse_http_url(&self.endpoint)?;

        if !(64..=4096).contains(&self.dimension) {
            return Err(ConfigError::InvalidEmbeddingDimension(self.dimension));
        }

        Ok(())
    }

    #[inline]
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        parse_http_url(&self.endpoint)
    }
}

impl PineconeConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(&self.api_key, "PINECONE_API_KEY")?;
        require(&self.environment, "PINECONE_ENVIRONMENT")?;
        require(&self.index_name, "PINECONE_INDEX_NAME")?;
        parse_http_url(&self.controller_url)?;

        if !(1..=100).contains(&self.top_k) {
            return Err(ConfigError::InvalidTopK(self.top_k));
        }

        Ok(())
    }

    #[inline]
    pub fn controller_url(&self) -> Result<Url, ConfigError> {
        parse_http_url(&self.controller_url)
    }
}

/// Hide all but the last four characters of a secret
#[inline]
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.is_empty() {
        return "(not set)".to_string();
    }
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}
