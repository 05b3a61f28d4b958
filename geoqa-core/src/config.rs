use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration for the question answering agent.
///
/// Every section has defaults, so a config file only needs the keys it
/// changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub rag: RagConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Configuration for the text generation model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub temperature: f64,
    /// Request timeout for the generation backend. None waits indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "llama3".to_string(),
            base_url: "http://localhost:11434".to_string(),
            temperature: 0.7,
            timeout_secs: None,
        }
    }
}

/// Which embedding function backs the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EmbedderConfig {
    /// Local feature-hashing embeddings, no external service
    Hashing { dimensions: usize },
    /// Embeddings from the provider's embedding endpoint
    Provider { model: String },
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self::Hashing { dimensions: 384 }
    }
}

/// Configuration for retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    #[serde(default)]
    pub embedder: EmbedderConfig,
    /// Number of documents retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Directory of markdown documents replacing the built-in corpus
    #[serde(default)]
    pub documents_dir: Option<String>,
}

fn default_top_k() -> usize {
    3
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            embedder: EmbedderConfig::default(),
            top_k: default_top_k(),
            documents_dir: None,
        }
    }
}

/// Configuration for answer composition and routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Number of top search results reported as citations
    #[serde(default = "default_citation_count")]
    pub citation_count: usize,
    /// Characters of each document included in the generation prompt
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
    /// Joins answer segments
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Per-tool trigger keyword overrides, keyed by tool name
    #[serde(default)]
    pub triggers: BTreeMap<String, Vec<String>>,
}

fn default_citation_count() -> usize {
    2
}

fn default_excerpt_chars() -> usize {
    300
}

fn default_separator() -> String {
    " ".to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            citation_count: default_citation_count(),
            excerpt_chars: default_excerpt_chars(),
            separator: default_separator(),
            triggers: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from `config.yaml` if it exists, otherwise use defaults.
    pub fn load_or_default() -> Self {
        Self::load("config.yaml").unwrap_or_default()
    }

    /// Write configuration as YAML.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_yaml::to_string(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rag_config_defaults() {
        let config = RagConfig::default();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.embedder, EmbedderConfig::Hashing { dimensions: 384 });
        assert!(config.documents_dir.is_none());
    }

    #[test]
    fn test_agent_config_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.citation_count, 2);
        assert_eq!(config.excerpt_chars, 300);
        assert_eq!(config.separator, " ");
        assert!(config.triggers.is_empty());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
llm:
  model: mistral
  base_url: http://gpu-box:11434
  temperature: 0.1
rag:
  embedder:
    kind: provider
    model: nomic-embed-text
agent:
  triggers:
    settlement_calculator: ["settle"]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.llm.model, "mistral");
        assert_eq!(config.llm.timeout_secs, None);
        assert_eq!(
            config.rag.embedder,
            EmbedderConfig::Provider {
                model: "nomic-embed-text".into()
            }
        );
        assert_eq!(config.rag.top_k, 3);
        assert_eq!(config.agent.citation_count, 2);
        assert_eq!(config.agent.triggers["settlement_calculator"], vec!["settle"]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = Config::default();
        config.llm.model = "qwen2.5:3b".into();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.llm.model, "qwen2.5:3b");
        assert_eq!(loaded.rag.top_k, 3);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/geoqa.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileRead(_)));
    }
}
