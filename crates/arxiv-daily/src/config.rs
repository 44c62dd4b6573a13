//! Job configuration loaded from YAML.

use notify::NotifyConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::arxiv::SearchConfig;
use crate::storage::RenderOptions;

/// Default results per topic.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Default digest title.
pub const DEFAULT_DIGEST_TITLE: &str = "arXiv Daily";

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid YAML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Values are present but unusable
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Keyword filter for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordFilter {
    /// Terms combined with `OR`, each quoted.
    pub filters: Vec<String>,
}

impl KeywordFilter {
    /// Build the search expression, e.g. `"TTS" OR "Text to Speech"`.
    #[must_use]
    pub fn query(&self) -> String {
        self.filters
            .iter()
            .map(|f| format!("\"{}\"", f.trim()))
            .collect::<Vec<_>>()
            .join(" OR ")
    }
}

/// Digest message settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestSettings {
    /// Name shown in the digest header.
    pub title: String,
    /// Link to the full archive, shown under a non-empty digest.
    pub archive_url: Option<String>,
}

impl Default for DigestSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_DIGEST_TITLE.to_string(),
            archive_url: None,
        }
    }
}

/// Complete job configuration. Built once at startup and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Topic label -> keyword filter.
    pub keywords: BTreeMap<String, KeywordFilter>,
    /// Maximum results requested per topic.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Persisted JSON record.
    pub json_readme_path: PathBuf,
    /// Rendered Markdown document.
    pub md_readme_path: PathBuf,
    /// Optional GitHub Pages variant of the document.
    #[serde(default)]
    pub web_md_path: Option<PathBuf>,
    /// Document layout.
    #[serde(default)]
    pub render: RenderOptions,
    /// Search provider settings.
    #[serde(default)]
    pub arxiv: SearchConfig,
    /// Digest message settings.
    #[serde(default)]
    pub digest: DigestSettings,
    /// Digest delivery settings.
    #[serde(default, alias = "wechat_push")]
    pub notify: NotifyConfig,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

impl Config {
    /// Load, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!(
            path = %path.display(),
            topics = config.keywords.len(),
            max_results = config.max_results,
            "Loaded config"
        );
        Ok(config)
    }

    /// Parse YAML text, apply environment overrides and validate.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yaml::from_str(content)?;
        config.notify = config.notify.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Topic label -> search expression.
    #[must_use]
    pub fn queries(&self) -> BTreeMap<String, String> {
        self.keywords
            .iter()
            .map(|(topic, filter)| (topic.clone(), filter.query()))
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.keywords.is_empty() {
            return Err(ConfigError::Invalid("no keywords configured".to_string()));
        }
        for (topic, filter) in &self.keywords {
            if filter.filters.iter().all(|f| f.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "topic '{topic}' has no filter terms"
                )));
            }
        }
        if self.max_results == 0 {
            return Err(ConfigError::Invalid("max_results must be positive".to_string()));
        }
        if self.arxiv.timeout_secs == 0 || self.notify.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be positive".to_string()));
        }
        Ok(())
    }
}
