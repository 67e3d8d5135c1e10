use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Upper bound on `graph.max_degree`. Unbounded search is not allowed.
pub const MAX_DEGREE_LIMIT: usize = 12;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub relnav: RelnavConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Relnav-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelnavConfig {
    /// Directory holding the person record partitions (one file per lineage).
    pub data_dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Relationship graph tuning
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    /// Maximum number of edges a relationship search may traverse.
    #[serde(default = "default_max_degree")]
    pub max_degree: usize,
    /// Number of sources whose path maps are computed right after the build.
    /// 0 disables precomputation.
    #[serde(default = "default_precompute_limit")]
    pub precompute_limit: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_degree: default_max_degree(),
            precompute_limit: default_precompute_limit(),
        }
    }
}

/// Path cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of per-source path maps kept in memory.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

fn default_max_degree() -> usize {
    6
}

fn default_precompute_limit() -> usize {
    100
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in RELNAV_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("RELNAV_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        Self::from_path(&config_path)
    }

    /// Load and validate configuration from an explicit path
    pub fn from_path(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if !self.relnav.data_dir.exists() {
            anyhow::bail!(
                "data_dir path does not exist: {}. Set data_dir in config.toml to your record partitions directory.",
                self.relnav.data_dir.display()
            );
        }

        if !self.relnav.data_dir.is_dir() {
            anyhow::bail!(
                "data_dir must be a directory, not a file: {}",
                self.relnav.data_dir.display()
            );
        }

        self.graph.validate()?;

        if self.cache.capacity == 0 {
            anyhow::bail!("cache.capacity must be greater than 0");
        }

        if self.graph.precompute_limit > self.cache.capacity {
            anyhow::bail!(
                "graph.precompute_limit ({}) must not exceed cache.capacity ({})",
                self.graph.precompute_limit,
                self.cache.capacity
            );
        }

        Ok(())
    }

    /// Get the record partitions directory
    pub fn data_dir(&self) -> &Path {
        &self.relnav.data_dir
    }
}

impl GraphConfig {
    /// Check the search bound is usable
    pub fn validate(&self) -> Result<()> {
        if self.max_degree == 0 || self.max_degree > MAX_DEGREE_LIMIT {
            anyhow::bail!(
                "graph.max_degree must be between 1 and {}, got {}",
                MAX_DEGREE_LIMIT,
                self.max_degree
            );
        }
        Ok(())
    }
}
