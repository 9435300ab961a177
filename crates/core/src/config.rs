//! Configuration management for DocBrain.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (`<data_dir>/config.yaml` or `DOCBRAIN_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources win. All persisted state lives below `data_dir`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Completion and embedding providers understood by the factories.
pub const KNOWN_PROVIDERS: [&str; 3] = ["openai", "ollama", "mock"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the vector index, prompt overrides and config.yaml
    pub data_dir: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Completion provider (e.g., "openai", "ollama", "mock")
    pub provider: String,

    /// Completion model identifier
    pub model: String,

    /// Custom completion endpoint
    pub endpoint: Option<String>,

    /// Sampling temperature for grounded answers
    pub temperature: f32,

    /// Embedding service settings
    pub embedding: EmbeddingSettings,

    /// Chunker geometry
    pub chunking: ChunkingSettings,

    /// Explicit API key (takes precedence over `api_key_env`)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Upper bound for each embedding or completion call, in seconds
    pub request_timeout_secs: u64,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON lines
    pub log_json: bool,
}

/// Embedding service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
    pub endpoint: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self::for_provider("openai")
    }
}

impl EmbeddingSettings {
    /// Default model and dimensions for a provider.
    pub fn for_provider(provider: &str) -> Self {
        let (model, dimensions) = match provider {
            "ollama" => ("nomic-embed-text", 768),
            "mock" => ("trigram-v1", 384),
            _ => ("text-embedding-3-small", 1536),
        };

        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            dimensions,
            endpoint: None,
        }
    }
}

/// Chunker geometry, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    storage: Option<StorageSection>,
    llm: Option<LlmSection>,
    embedding: Option<EmbeddingSection>,
    chunking: Option<ChunkingSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageSection {
    #[serde(rename = "dataDir")]
    data_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    temperature: Option<f32>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddingSection {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChunkingSection {
    #[serde(rename = "chunkSize")]
    chunk_size: Option<usize>,
    #[serde(rename = "chunkOverlap")]
    chunk_overlap: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".docbrain"),
            config_file: None,
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            endpoint: None,
            temperature: 0.1,
            embedding: EmbeddingSettings::default(),
            chunking: ChunkingSettings::default(),
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            request_timeout_secs: 60,
            log_level: None,
            verbose: false,
            no_color: false,
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and environment variables.
    ///
    /// Environment variables:
    /// - `DOCBRAIN_DATA_DIR`: Override data directory
    /// - `DOCBRAIN_CONFIG`: Path to config file
    /// - `DOCBRAIN_PROVIDER`: Completion provider
    /// - `DOCBRAIN_MODEL`: Completion model
    /// - `DOCBRAIN_EMBEDDING_PROVIDER`: Embedding provider
    /// - `DOCBRAIN_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use docbrain_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Data dir: {:?}", config.data_dir);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Load configuration, locating the YAML file from command-line values.
    ///
    /// `data_dir` and `config_file` take precedence over `DOCBRAIN_DATA_DIR`
    /// and `DOCBRAIN_CONFIG` when deciding which file to read. An explicitly
    /// named config file must exist.
    pub fn load_from(data_dir: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(dir) = data_dir.or_else(|| env_path("DOCBRAIN_DATA_DIR")) {
            config.data_dir = dir;
        }
        config.config_file = config_file.or_else(|| env_path("DOCBRAIN_CONFIG"));

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.data_dir.join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file does not exist: {:?}",
                config_path
            )));
        }

        config.apply_env();
        Ok(config)
    }

    /// Environment variables override YAML config.
    fn apply_env(&mut self) {
        if let Some(dir) = env_path("DOCBRAIN_DATA_DIR") {
            self.data_dir = dir;
        }

        if let Ok(provider) = std::env::var("DOCBRAIN_PROVIDER") {
            self.provider = provider;
        }

        if let Ok(model) = std::env::var("DOCBRAIN_MODEL") {
            self.model = model;
        }

        if let Ok(provider) = std::env::var("DOCBRAIN_EMBEDDING_PROVIDER") {
            if provider != self.embedding.provider {
                let endpoint = self.embedding.endpoint.take();
                self.embedding = EmbeddingSettings::for_provider(&provider);
                self.embedding.endpoint = endpoint;
            }
        }

        if let Ok(key) = std::env::var("DOCBRAIN_API_KEY") {
            self.api_key = Some(key);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(dir) = config_file.storage.and_then(|s| s.data_dir) {
            result.data_dir = PathBuf::from(dir);
        }

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
            if let Some(temperature) = llm.temperature {
                result.temperature = temperature;
            }
            if let Some(env) = llm.api_key_env {
                result.api_key_env = env;
            }
            if let Some(secs) = llm.timeout_secs {
                result.request_timeout_secs = secs;
            }
        }

        if let Some(embedding) = config_file.embedding {
            if let Some(provider) = embedding.provider {
                if provider != result.embedding.provider {
                    result.embedding = EmbeddingSettings::for_provider(&provider);
                }
            }
            if let Some(model) = embedding.model {
                result.embedding.model = model;
            }
            if let Some(dimensions) = embedding.dimensions {
                result.embedding.dimensions = dimensions;
            }
            if embedding.endpoint.is_some() {
                result.embedding.endpoint = embedding.endpoint;
            }
        }

        if let Some(chunking) = config_file.chunking {
            if let Some(size) = chunking.chunk_size {
                result.chunking.chunk_size = size;
            }
            if let Some(overlap) = chunking.chunk_overlap {
                result.chunking.chunk_overlap = overlap;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(json) = logging.json {
                result.log_json = json;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Directory holding the persisted vector index.
    pub fn vectors_dir(&self) -> PathBuf {
        self.data_dir.join("vectors")
    }

    /// Directory searched for prompt overrides.
    pub fn prompts_dir(&self) -> PathBuf {
        self.data_dir.join("prompts")
    }

    /// Time budget for a single embedding or completion call.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolve the API key: explicit value first, then the configured env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    /// Validate configuration for the active providers.
    pub fn validate(&self) -> AppResult<()> {
        for (role, provider) in [
            ("completion", &self.provider),
            ("embedding", &self.embedding.provider),
        ] {
            if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
                return Err(AppError::Config(format!(
                    "Unknown {} provider: {}. Supported: {}",
                    role,
                    provider,
                    KNOWN_PROVIDERS.join(", ")
                )));
            }
        }

        let needs_key = self.provider == "openai" || self.embedding.provider == "openai";
        if needs_key && self.resolve_api_key().is_none() {
            return Err(AppError::Config(format!(
                "API key not found. Set {} or DOCBRAIN_API_KEY",
                self.api_key_env
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        let ChunkingSettings {
            chunk_size,
            chunk_overlap,
        } = self.chunking;
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(AppError::Config(format!(
                "Invalid chunking: size {} must be positive and larger than overlap {}",
                chunk_size, chunk_overlap
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "Request timeout must be at least one second".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name).map(PathBuf::from)
}
