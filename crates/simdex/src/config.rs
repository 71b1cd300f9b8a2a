use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use simdex_core::vectorize::VectorMethod;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub vector: VectorConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_chunk_size() -> usize {
    50
}

#[derive(Debug, Deserialize, Clone)]
pub struct VectorConfig {
    /// `"frequency"` (fixed-dimension term-frequency vectors, cosine) or
    /// `"token-set"` (distinct-token sets, overlap coefficient, local-only).
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_dims")]
    pub dims: usize,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            dims: default_dims(),
        }
    }
}

fn default_method() -> String {
    "frequency".to_string()
}

fn default_dims() -> usize {
    simdex_core::vectorize::DEFAULT_DIMS
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Default result count for `find_similar` when the caller does not
    /// pass one.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Keep at most one chunk per source file in the result list.
    #[serde(default = "default_dedup_by_file")]
    pub dedup_by_file: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            dedup_by_file: default_dedup_by_file(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

fn default_dedup_by_file() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    /// Base URL of the vector-store service.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Index name within the service.
    #[serde(default = "default_index")]
    pub index: String,
    /// Name of the environment variable holding the API key. Presence
    /// of the key is the sole switch between remote-eligible and
    /// local-only startup.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_cloud")]
    pub cloud: String,
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            index: default_index(),
            api_key_env: default_api_key_env(),
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
            cloud: default_cloud(),
            region: default_region(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.simdex.dev".to_string()
}

fn default_index() -> String {
    "simdex".to_string()
}

fn default_api_key_env() -> String {
    "SIMDEX_API_KEY".to_string()
}

fn default_batch_size() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_cloud() -> String {
    "aws".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScannerConfig {
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec![
        "**/*.rs".to_string(),
        "**/*.ts".to_string(),
        "**/*.tsx".to_string(),
        "**/*.js".to_string(),
        "**/*.jsx".to_string(),
        "**/*.py".to_string(),
        "**/*.go".to_string(),
        "**/*.java".to_string(),
    ]
}

impl VectorConfig {
    pub fn method(&self) -> Result<VectorMethod> {
        match self.method.as_str() {
            "frequency" => Ok(VectorMethod::Frequency),
            "token-set" => Ok(VectorMethod::TokenSet),
            other => anyhow::bail!(
                "Unknown vector method: '{}'. Must be frequency or token-set.",
                other
            ),
        }
    }
}

impl RemoteConfig {
    /// Read the API key from the configured environment variable.
    /// Absence is not an error — it selects local-only operation.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

/// Load the config file when it exists; otherwise fall back to defaults.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }

    if config.vector.dims == 0 {
        anyhow::bail!("vector.dims must be > 0");
    }
    config.vector.method()?;

    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }

    if config.remote.batch_size < 1 {
        anyhow::bail!("remote.batch_size must be >= 1");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.chunking.chunk_size, 50);
        assert_eq!(config.vector.dims, 3072);
        assert_eq!(config.vector.method().unwrap(), VectorMethod::Frequency);
        assert_eq!(config.retrieval.top_k, 5);
        assert!(config.retrieval.dedup_by_file);
        assert_eq!(config.remote.batch_size, 10);
        assert_eq!(config.remote.api_key_env, "SIMDEX_API_KEY");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [vector]
            dims = 384

            [retrieval]
            dedup_by_file = false
            "#,
        )
        .unwrap();
        assert_eq!(config.vector.dims, 384);
        assert!(!config.retrieval.dedup_by_file);
        assert_eq!(config.chunking.chunk_size, 50);
    }

    #[test]
    fn test_unknown_method_rejected() {
        let config: Config = toml::from_str(
            r#"
            [vector]
            method = "embedding"
            "#,
        )
        .unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let config: Config = toml::from_str(
            r#"
            [chunking]
            chunk_size = 0
            "#,
        )
        .unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_token_set_method_parses() {
        let config: Config = toml::from_str(
            r#"
            [vector]
            method = "token-set"
            "#,
        )
        .unwrap();
        assert_eq!(config.vector.method().unwrap(), VectorMethod::TokenSet);
    }
}
