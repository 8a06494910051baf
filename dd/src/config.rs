//! Draftdaemon configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::GenerationDepth;

/// Main draftdaemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Workflow defaults
    pub workflow: WorkflowConfig,

    /// Document type catalog paths
    pub doctypes: DoctypesConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .draftdaemon.yml
        let local_config = PathBuf::from(".draftdaemon.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/draftdaemon/draftdaemon.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("draftdaemon").join("draftdaemon.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!(
                            "Failed to load config from {}: {}",
                            user_config.display(),
                            e
                        );
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "anthropic" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 8192,
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).wrap_err_with(|| {
            format!("API key not found in environment variable {}", self.api_key_env)
        })
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the session records
    #[serde(rename = "sessions-dir")]
    pub sessions_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // XDG data directory (~/.local/share/draftdaemon/sessions on Linux)
        let sessions_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("draftdaemon")
            .join("sessions");
        Self { sessions_dir }
    }
}

/// Workflow defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Document type used when a session does not name one
    #[serde(rename = "default-document-type")]
    pub default_document_type: String,

    /// Generation depth used when the caller does not choose one
    #[serde(rename = "default-depth")]
    pub default_depth: GenerationDepth,

    /// Search completed sessions for reusable skeletons
    #[serde(rename = "reuse-candidates")]
    pub reuse_candidates: bool,

    /// Maximum reuse candidates offered to the skeleton step
    #[serde(rename = "max-candidates")]
    pub max_candidates: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            default_document_type: "service-agreement".to_string(),
            default_depth: GenerationDepth::Standard,
            reuse_candidates: true,
            max_candidates: 3,
        }
    }
}

/// Document type catalog paths
///
/// Builtin types are always available; directory definitions override them
/// by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DoctypesConfig {
    /// Paths to search for document type definitions (searched in order)
    pub paths: Vec<String>,
}

impl Default for DoctypesConfig {
    fn default() -> Self {
        Self {
            paths: vec![
                "~/.config/draftdaemon/doctypes".to_string(),
                ".draftdaemon/doctypes".to_string(),
            ],
        }
    }
}

impl DoctypesConfig {
    /// Expand paths (resolve ~/ and relative paths)
    pub fn expanded_paths(&self) -> Vec<PathBuf> {
        self.paths
            .iter()
            .filter_map(|p| {
                if let Some(rest) = p.strip_prefix("~/") {
                    dirs::home_dir().map(|home| home.join(rest))
                } else {
                    Some(PathBuf::from(p))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.workflow.default_document_type, "service-agreement");
        assert_eq!(config.workflow.default_depth, GenerationDepth::Standard);
        assert!(config.workflow.reuse_candidates);
    }

    #[test]
    fn test_llm_config_defaults() {
        let config = LlmConfig::default();

        assert_eq!(config.provider, "anthropic");
        assert!(config.model.contains("sonnet"));
        assert_eq!(config.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.base_url, "https://api.anthropic.com");
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  provider: anthropic
  model: claude-opus-4
  api-key-env: MY_API_KEY
  base-url: https://api.example.com
  max-tokens: 4096
  timeout-ms: 60000

workflow:
  default-document-type: mutual-nda
  default-depth: extended
  reuse-candidates: false

storage:
  sessions-dir: /tmp/draftdaemon-test/sessions
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "claude-opus-4");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.workflow.default_document_type, "mutual-nda");
        assert_eq!(config.workflow.default_depth, GenerationDepth::Extended);
        assert!(!config.workflow.reuse_candidates);
        assert_eq!(
            config.storage.sessions_dir,
            PathBuf::from("/tmp/draftdaemon-test/sessions")
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: claude-haiku
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.llm.model, "claude-haiku");

        // Defaults for unspecified
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.workflow.max_candidates, 3);
    }

    #[test]
    #[serial_test::serial]
    fn test_get_api_key_reads_configured_env_var() {
        let config = LlmConfig {
            api_key_env: "DRAFTDAEMON_TEST_KEY".to_string(),
            ..LlmConfig::default()
        };

        unsafe { std::env::set_var("DRAFTDAEMON_TEST_KEY", "sk-test") };
        assert_eq!(config.get_api_key().unwrap(), "sk-test");

        unsafe { std::env::remove_var("DRAFTDAEMON_TEST_KEY") };
        assert!(config.get_api_key().is_err());
    }

    #[test]
    fn test_doctype_path_expansion() {
        let config = DoctypesConfig {
            paths: vec!["~/.config/draftdaemon/doctypes".to_string(), "local/types".to_string()],
        };
        let expanded = config.expanded_paths();
        assert_eq!(expanded.len(), 2);
        assert!(expanded[0].is_absolute() || dirs::home_dir().is_none());
        assert_eq!(expanded[1], PathBuf::from("local/types"));
    }
}
