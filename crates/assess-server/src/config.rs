use std::path::PathBuf;

use assess_common::openai::OpenAiClientConfig;
use assess_engine::index::IndexMode;
use assess_engine::retrieve::DEFAULT_CANDIDATE_POOL;

use crate::error::AppError;

pub const DEFAULT_CATALOG_PATH: &str = "shl_full_catalog.json";
pub const DEFAULT_FALLBACK_CATALOG_PATH: &str = "assessments_data.json";
pub const MIN_CANDIDATE_POOL: usize = 10;

/// Application configuration loaded explicitly from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub catalog_path: PathBuf,
    pub fallback_catalog_path: PathBuf,
    pub index_mode: IndexMode,
    /// fastembed model cache. `None` uses the library default.
    pub embedding_cache_dir: Option<PathBuf>,
    pub candidate_pool: usize,
    /// `false` forces the heuristic strategy even when credentials are present.
    pub oracle_enabled: bool,
    /// Serve HTTP on this address. Takes precedence over MCP.
    pub http_addr: Option<String>,
    /// Serve MCP over TCP on this address instead of stdio.
    pub mcp_tcp_addr: Option<String>,
    pub openai: OpenAiClientConfig,
}

impl Config {
    /// Optional (all have defaults):
    /// - `RECOMMENDER_CATALOG_PATH`, `RECOMMENDER_FALLBACK_CATALOG_PATH`
    /// - `RECOMMENDER_INDEX_MODE`: `dense` or `sparse`
    /// - `RECOMMENDER_EMBEDDING_CACHE_DIR`
    /// - `RECOMMENDER_CANDIDATE_POOL`: retrieval pool size, at least 10
    /// - `RECOMMENDER_ORACLE`: `on` or `off`
    /// - `RECOMMENDER_HTTP_ADDR`, `MCP_TCP_LISTEN_ADDR`
    /// - `OPENAI_*`: see [`OpenAiClientConfig::from_lookup`]
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let index_mode = match value("RECOMMENDER_INDEX_MODE").map(|v| v.to_lowercase()) {
            None => IndexMode::Dense,
            Some(v) if v == "dense" => IndexMode::Dense,
            Some(v) if v == "sparse" => IndexMode::Sparse,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "RECOMMENDER_INDEX_MODE must be 'dense' or 'sparse', got '{other}'"
                )))
            }
        };

        let candidate_pool = match value("RECOMMENDER_CANDIDATE_POOL") {
            None => DEFAULT_CANDIDATE_POOL,
            Some(v) => v
                .parse::<usize>()
                .map_err(|_| {
                    AppError::Config(format!(
                        "RECOMMENDER_CANDIDATE_POOL must be a positive integer, got '{v}'"
                    ))
                })?
                .max(MIN_CANDIDATE_POOL),
        };

        let oracle_enabled = match value("RECOMMENDER_ORACLE").map(|v| v.to_lowercase()) {
            None => true,
            Some(v) if matches!(v.as_str(), "on" | "true" | "1") => true,
            Some(v) if matches!(v.as_str(), "off" | "false" | "0") => false,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "RECOMMENDER_ORACLE must be 'on' or 'off', got '{other}'"
                )))
            }
        };

        Ok(Self {
            catalog_path: value("RECOMMENDER_CATALOG_PATH")
                .unwrap_or_else(|| DEFAULT_CATALOG_PATH.to_string())
                .into(),
            fallback_catalog_path: value("RECOMMENDER_FALLBACK_CATALOG_PATH")
                .unwrap_or_else(|| DEFAULT_FALLBACK_CATALOG_PATH.to_string())
                .into(),
            index_mode,
            embedding_cache_dir: value("RECOMMENDER_EMBEDDING_CACHE_DIR").map(PathBuf::from),
            candidate_pool,
            oracle_enabled,
            http_addr: value("RECOMMENDER_HTTP_ADDR"),
            mcp_tcp_addr: value("MCP_TCP_LISTEN_ADDR"),
            openai: OpenAiClientConfig::from_lookup(&lookup),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_any_variables() {
        let config = config(&[]).unwrap();
        assert_eq!(config.catalog_path, PathBuf::from("shl_full_catalog.json"));
        assert_eq!(config.fallback_catalog_path, PathBuf::from("assessments_data.json"));
        assert_eq!(config.index_mode, IndexMode::Dense);
        assert_eq!(config.candidate_pool, 30);
        assert!(config.oracle_enabled);
        assert!(config.http_addr.is_none());
        assert!(config.mcp_tcp_addr.is_none());
        assert!(config.openai.api_key.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("RECOMMENDER_CATALOG_PATH", "/data/catalog.json"),
            ("RECOMMENDER_INDEX_MODE", " Sparse "),
            ("RECOMMENDER_CANDIDATE_POOL", "50"),
            ("RECOMMENDER_ORACLE", "off"),
            ("RECOMMENDER_HTTP_ADDR", "0.0.0.0:5000"),
            ("OPENAI_API_KEY", "secret"),
        ])
        .unwrap();
        assert_eq!(config.catalog_path, PathBuf::from("/data/catalog.json"));
        assert_eq!(config.index_mode, IndexMode::Sparse);
        assert_eq!(config.candidate_pool, 50);
        assert!(!config.oracle_enabled);
        assert_eq!(config.http_addr.as_deref(), Some("0.0.0.0:5000"));
        assert_eq!(config.openai.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn small_candidate_pool_is_raised() {
        let config = config(&[("RECOMMENDER_CANDIDATE_POOL", "3")]).unwrap();
        assert_eq!(config.candidate_pool, MIN_CANDIDATE_POOL);
    }

    #[test]
    fn malformed_values_are_config_errors() {
        for vars in [
            [("RECOMMENDER_INDEX_MODE", "foo")],
            [("RECOMMENDER_CANDIDATE_POOL", "many")],
            [("RECOMMENDER_ORACLE", "maybe")],
        ] {
            assert!(matches!(config(&vars), Err(AppError::Config(_))), "{vars:?}");
        }
    }
}
