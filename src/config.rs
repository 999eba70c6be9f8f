//! YAML configuration for the CodeFix engine.
//!
//! ## Example
//!
//! ```yaml
//! version: "1.0"
//! name: "react-kb"
//!
//! calibration:
//!   midpoint: 0.5
//!   steepness: 10.0
//!
//! gate:
//!   threshold: 0.5
//!
//! knowledge_base:
//!   path: "data/examples.json"
//!   allow_empty: false
//!
//! embedding:
//!   dimension: 384
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calibrate::Calibration;
use crate::embed::HashingEmbedder;
use crate::gate::Gate;
use crate::store::{LoadOptions, Solution};
use crate::types::MatchPolicy;

/// Errors that can occur when loading configuration or knowledge base files.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("failed to parse knowledge base JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CodefixConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub calibration: Calibration,

    #[serde(default)]
    pub gate: Gate,

    #[serde(default)]
    pub knowledge_base: KnowledgeBaseYamlConfig,

    #[serde(default)]
    pub embedding: EmbeddingYamlConfig,
}

impl CodefixConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: CodefixConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.policy()
            .validate()
            .map_err(ConfigLoadError::Validation)?;
        self.embedding.validate()?;
        Ok(())
    }

    /// Runtime policy described by this config.
    pub fn policy(&self) -> MatchPolicy {
        MatchPolicy {
            calibration: self.calibration,
            gate: self.gate,
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            allow_empty: self.knowledge_base.allow_empty,
        }
    }

    pub fn embedder(&self) -> HashingEmbedder {
        HashingEmbedder::new(self.embedding.dimension)
    }
}

impl Default for CodefixConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            calibration: Calibration::default(),
            gate: Gate::default(),
            knowledge_base: KnowledgeBaseYamlConfig::default(),
            embedding: EmbeddingYamlConfig::default(),
        }
    }
}

/// Where the curated solutions come from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseYamlConfig {
    /// JSON array of solution documents. When absent the built-in set is used.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub allow_empty: bool,
}

impl KnowledgeBaseYamlConfig {
    /// Read solution documents from [`path`](Self::path), if configured.
    pub fn read_documents(&self) -> Result<Option<Vec<Solution>>, ConfigLoadError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(None);
        };
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

/// Embedding collaborator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingYamlConfig {
    #[serde(default = "default_dimension")]
    pub dimension: usize,
}

impl EmbeddingYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.dimension == 0 {
            return Err(ConfigLoadError::Validation(
                "embedding.dimension must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EmbeddingYamlConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
        }
    }
}

fn default_dimension() -> usize {
    HashingEmbedder::DEFAULT_DIMENSION
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "test config"
calibration:
  midpoint: 0.6
gate:
  threshold: 0.7
"#;

        let config = CodefixConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.name, Some("test config".to_string()));
        assert_eq!(config.calibration.midpoint, 0.6);
        assert_eq!(config.calibration.steepness, 10.0);
        assert_eq!(config.gate.threshold, 0.7);
        assert_eq!(config.embedding.dimension, 384);
        assert!(config.knowledge_base.path.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"version: \"1\"\nknowledge_base:\n  allow_empty: true\n")
            .unwrap();

        let config = CodefixConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.version, "1");
        assert!(config.load_options().allow_empty);
    }

    #[test]
    fn test_default_config() {
        let config = CodefixConfig::default();
        assert_eq!(config.version, "1.0");
        assert!(config.name.is_none());
        assert_eq!(config.policy(), MatchPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unsupported_version() {
        let err = CodefixConfig::from_yaml("version: \"2.0\"\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnsupportedVersion(v) if v == "2.0"));
    }

    #[test]
    fn test_threshold_validation() {
        let yaml = r#"
version: "1.0"
gate:
  threshold: 1.5
"#;
        let err = CodefixConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn test_steepness_validation() {
        let yaml = r#"
version: "1.0"
calibration:
  steepness: -2.0
"#;
        let err = CodefixConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("steepness"));
    }

    #[test]
    fn test_dimension_validation() {
        let yaml = r#"
version: "1.0"
embedding:
  dimension: 0
"#;
        let err = CodefixConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("dimension must be >= 1"));
    }

    #[test]
    fn test_read_documents() {
        let mut kb_file = NamedTempFile::new().unwrap();
        kb_file
            .write_all(
                br#"[{"title": "t", "description": "d", "solution": "s",
                      "code_example": "c", "source": "src", "tags": ["react"]}]"#,
            )
            .unwrap();

        let cfg = KnowledgeBaseYamlConfig {
            path: Some(kb_file.path().to_path_buf()),
            allow_empty: false,
        };
        let docs = cfg.read_documents().unwrap().expect("documents");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].tags, vec!["react".to_string()]);
        assert!(docs[0].keywords.is_empty());

        assert!(KnowledgeBaseYamlConfig::default()
            .read_documents()
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_read_documents_bad_json() {
        let mut kb_file = NamedTempFile::new().unwrap();
        kb_file.write_all(b"{not json").unwrap();
        let cfg = KnowledgeBaseYamlConfig {
            path: Some(kb_file.path().to_path_buf()),
            allow_empty: false,
        };
        assert!(matches!(
            cfg.read_documents(),
            Err(ConfigLoadError::JsonParse(_))
        ));
    }
}
