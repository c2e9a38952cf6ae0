use serde::Deserialize;

use crate::services::RecommendOptions;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path of the JSON catalog loaded at startup
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum number of hops walked by the path enumerator
    #[serde(default = "default_max_path_depth")]
    pub max_path_depth: usize,

    /// Number of recommendations returned per query
    #[serde(default = "default_recommendation_limit")]
    pub recommendation_limit: usize,

    /// Optional cap on nodes expanded per path query
    #[serde(default)]
    pub path_visit_budget: Option<usize>,
}

fn default_catalog_path() -> String {
    "data/catalog.json".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_path_depth() -> usize {
    3
}

fn default_recommendation_limit() -> usize {
    10
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Recommendation tuning derived from this configuration
    pub fn recommend_options(&self) -> RecommendOptions {
        RecommendOptions {
            max_depth: self.max_path_depth,
            limit: self.recommendation_limit,
            visit_budget: self.path_visit_budget,
        }
    }
}
