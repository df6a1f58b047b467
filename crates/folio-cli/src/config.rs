//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use folio_extractor::{SourceProfile, BUILTIN_PROFILES};
use folio_llm::openai::{DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use folio_llm::OpenAiProvider;
use folio_store::ArtifactLayout;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// LLM connection settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Artifact locations
    #[serde(default)]
    pub paths: PathSettings,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// User-defined source profiles; these shadow built-ins of the same name
    #[serde(default)]
    pub profiles: BTreeMap<String, SourceProfile>,
}

/// LLM connection settings.
///
/// The API key itself is never stored in the file, only the name of the
/// environment variable holding it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Attempts per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Artifact locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Directory for output tables
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory for checkpoints
    #[serde(default = "default_progress_dir")]
    pub progress_dir: PathBuf,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".folio").join("config.toml"))
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        for (key, profile) in config.profiles.iter_mut() {
            if profile.name.is_empty() {
                profile.name = key.clone();
            }
        }
        Ok(config)
    }

    /// Resolve a profile by name: configured profiles first, then built-ins.
    pub fn profile(&self, name: &str) -> Result<SourceProfile> {
        let profile = self
            .profiles
            .get(name)
            .cloned()
            .or_else(|| SourceProfile::builtin(name))
            .ok_or_else(|| {
                CliError::Config(format!(
                    "Unknown profile '{}' (available: {})",
                    name,
                    self.profile_names().join(", ")
                ))
            })?;

        profile
            .validate()
            .map_err(|e| CliError::Config(format!("Profile '{}': {}", name, e)))?;
        Ok(profile)
    }

    /// Names of every resolvable profile, built-ins first.
    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = BUILTIN_PROFILES.iter().map(|s| s.to_string()).collect();
        for name in self.profiles.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// Artifact layout for a profile.
    pub fn layout(&self, profile: &SourceProfile) -> ArtifactLayout {
        ArtifactLayout::new(&self.paths.output_dir, &self.paths.progress_dir)
            .with_suffix(profile.artifact_suffix.clone())
    }

    /// Build the LLM provider, reading the API key from the environment.
    pub fn provider(&self, model_override: Option<&str>) -> Result<OpenAiProvider> {
        let api_key = std::env::var(&self.llm.api_key_env).map_err(|_| {
            CliError::Config(format!(
                "{} environment variable not set",
                self.llm.api_key_env
            ))
        })?;
        let model = model_override.unwrap_or(&self.llm.model);

        let provider = OpenAiProvider::new(&self.llm.endpoint, api_key, model)?
            .with_max_retries(self.llm.max_retries)
            .with_timeout(Duration::from_secs(self.llm.request_timeout_secs))?;
        Ok(provider)
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_retries: default_max_retries(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            progress_dir: default_progress_dir(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_request_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_progress_dir() -> PathBuf {
    PathBuf::from("data/progress")
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
