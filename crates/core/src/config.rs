//! Configuration management for notelink.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (.notelink/config.yaml)
//!
//! The configuration is vault-centric: generated notes live in the vault,
//! and internal state is stored under `.notelink/`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Default text-analysis (messages) endpoint.
const DEFAULT_MESSAGES_ENDPOINT: &str = "https://api.anthropic.com";

/// Default transcription service endpoint.
const DEFAULT_TRANSCRIPTION_ENDPOINT: &str = "http://127.0.0.1:8000";

/// Default oEmbed endpoint for title lookup.
const DEFAULT_OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

/// Main application configuration.
///
/// Holds all global options that affect behavior across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the note vault root (contains .notelink/)
    pub vault: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Text-analysis backend endpoint (messages API)
    pub messages_endpoint: String,

    /// Model identifier for the text-analysis backend
    pub model: String,

    /// API key for the text-analysis backend
    pub api_key: Option<String>,

    /// Transcription service endpoint
    pub transcription_endpoint: String,

    /// oEmbed endpoint for video title lookup
    pub oembed_endpoint: String,

    /// Maximum chunk size in characters
    pub chunk_size: usize,

    /// Embedding vector dimension
    pub embedding_dim: usize,

    /// Minimum cosine similarity for a connection (strict greater-than)
    pub similarity_threshold: f32,

    /// Vault subfolder where generated notes are written
    pub notes_folder: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure (.notelink/config.yaml).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    backends: Option<BackendsConfig>,
    linking: Option<LinkingConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BackendsConfig {
    #[serde(rename = "messagesEndpoint")]
    messages_endpoint: Option<String>,
    model: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
    #[serde(rename = "transcriptionEndpoint")]
    transcription_endpoint: Option<String>,
    #[serde(rename = "oembedEndpoint")]
    oembed_endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LinkingConfig {
    #[serde(rename = "chunkSize")]
    chunk_size: Option<usize>,
    #[serde(rename = "embeddingDim")]
    embedding_dim: Option<usize>,
    #[serde(rename = "similarityThreshold")]
    similarity_threshold: Option<f32>,
    #[serde(rename = "notesFolder")]
    notes_folder: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            vault: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            messages_endpoint: DEFAULT_MESSAGES_ENDPOINT.to_string(),
            model: "claude-3-haiku-20240307".to_string(),
            api_key: None,
            transcription_endpoint: DEFAULT_TRANSCRIPTION_ENDPOINT.to_string(),
            oembed_endpoint: DEFAULT_OEMBED_ENDPOINT.to_string(),
            chunk_size: 1000,
            embedding_dim: 64,
            similarity_threshold: 0.75,
            notes_folder: "YouTube Notes".to_string(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `NOTELINK_VAULT`: Override vault path
    /// - `NOTELINK_CONFIG`: Path to config file
    /// - `NOTELINK_MODEL`: Model identifier
    /// - `NOTELINK_API_KEY` / `ANTHROPIC_API_KEY`: API key
    /// - `NOTELINK_TRANSCRIPTION_URL`: Transcription service endpoint
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(vault) = std::env::var("NOTELINK_VAULT") {
            config.vault = PathBuf::from(vault);
        }

        if let Ok(config_file) = std::env::var("NOTELINK_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.vault.exists() {
            return Err(AppError::Config(format!(
                "Vault directory does not exist: {:?}",
                config.vault
            )));
        }

        // Load from YAML config file if it exists
        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            config.vault.join(".notelink/config.yaml")
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(model) = std::env::var("NOTELINK_MODEL") {
            config.model = model;
        }

        if let Ok(endpoint) = std::env::var("NOTELINK_TRANSCRIPTION_URL") {
            config.transcription_endpoint = endpoint;
        }

        if config.api_key.is_none() {
            config.api_key = std::env::var("NOTELINK_API_KEY")
                .or_else(|_| std::env::var("ANTHROPIC_API_KEY"))
                .ok();
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(backends) = config_file.backends {
            if let Some(endpoint) = backends.messages_endpoint {
                result.messages_endpoint = endpoint;
            }
            if let Some(model) = backends.model {
                result.model = model;
            }
            if let Some(endpoint) = backends.transcription_endpoint {
                result.transcription_endpoint = endpoint;
            }
            if let Some(endpoint) = backends.oembed_endpoint {
                result.oembed_endpoint = endpoint;
            }
            if let Some(env_var) = backends.api_key_env {
                if let Ok(key) = std::env::var(&env_var) {
                    result.api_key = Some(key);
                }
            }
        }

        if let Some(linking) = config_file.linking {
            if let Some(size) = linking.chunk_size {
                result.chunk_size = size;
            }
            if let Some(dim) = linking.embedding_dim {
                result.embedding_dim = dim;
            }
            if let Some(threshold) = linking.similarity_threshold {
                result.similarity_threshold = threshold;
            }
            if let Some(folder) = linking.notes_folder {
                result.notes_folder = folder;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Merges command-line flags with the loaded configuration, giving
    /// precedence to CLI flags over environment variables.
    pub fn with_overrides(
        mut self,
        vault: Option<PathBuf>,
        config_file: Option<PathBuf>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(vault) = vault {
            self.vault = vault;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
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

    /// Get the path to the .notelink directory.
    pub fn notelink_dir(&self) -> PathBuf {
        self.vault.join(".notelink")
    }

    /// Get the path to the persisted vector store.
    pub fn store_path(&self) -> PathBuf {
        self.notelink_dir().join("embeddings.json")
    }

    /// Ensure the .notelink directory exists.
    pub fn ensure_notelink_dir(&self) -> AppResult<()> {
        let dir = self.notelink_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .notelink directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Validate configuration before any network call.
    ///
    /// A missing API key fails here, fast, rather than surfacing as a 401
    /// mid-run.
    pub fn validate(&self) -> AppResult<()> {
        if self.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(AppError::Config(
                "API key not set. Set NOTELINK_API_KEY or ANTHROPIC_API_KEY, \
                 or configure apiKeyEnv in .notelink/config.yaml"
                    .to_string(),
            ));
        }

        if self.chunk_size == 0 {
            return Err(AppError::Config("chunkSize must be positive".to_string()));
        }

        if self.embedding_dim == 0 {
            return Err(AppError::Config(
                "embeddingDim must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.embedding_dim, 64);
        assert_eq!(config.similarity_threshold, 0.75);
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_store_path() {
        let config = AppConfig::default();
        let path = config.store_path();
        assert!(path.ends_with(".notelink/embeddings.json"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            None,
            Some("claude-3-5-sonnet-latest".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.model, "claude-3-5-sonnet-latest");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_missing_api_key() {
        let mut config = AppConfig::default();
        config.api_key = None;
        assert!(config.validate().is_err());

        config.api_key = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_with_api_key() {
        let mut config = AppConfig::default();
        config.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_log_level_survives_load_without_rust_log() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join(".notelink")).unwrap();
        std::fs::write(
            temp.path().join(".notelink/config.yaml"),
            "logging:\n  level: debug\n",
        )
        .unwrap();

        // An unset RUST_LOG must not clobber the level from the config file
        std::env::remove_var("RUST_LOG");
        std::env::set_var("NOTELINK_VAULT", temp.path());
        let config = AppConfig::load().unwrap();
        std::env::remove_var("NOTELINK_VAULT");

        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml() {
        let temp = tempfile::TempDir::new().unwrap();
        let config_path = temp.path().join("config.yaml");
        std::fs::write(
            &config_path,
            "linking:\n  chunkSize: 500\n  similarityThreshold: 0.6\nlogging:\n  level: debug\n",
        )
        .unwrap();

        let mut config = AppConfig::default();
        let merged = config.merge_yaml(&config_path).unwrap();

        assert_eq!(merged.chunk_size, 500);
        assert_eq!(merged.similarity_threshold, 0.6);
        assert_eq!(merged.log_level, Some("debug".to_string()));
        // Untouched fields keep defaults
        assert_eq!(merged.embedding_dim, 64);
    }
}
