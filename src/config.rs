use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable holding the token-signing secret.
///
/// Read once at startup; never reloaded or rotated during the process
/// lifetime. A missing secret is a fatal startup error.
pub const JWT_SECRET_ENV: &str = "STREAMVAULT_JWT_SECRET";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub security: SecurityConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Token-signing secret, sourced from the environment by [`Config::load`],
    /// never from the config file. Tests inject a fixture value directly.
    #[serde(skip)]
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/streamvault.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 7979,
            cors_allowed_origins: vec![
                "http://localhost:7979".to_string(),
                "http://127.0.0.1:7979".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    /// Lower values reduce memory usage but decrease GPU resistance.
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations) - higher = more CPU work
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

/// Object-store settings for presigned media upload/delete URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub region: String,

    pub bucket: String,

    pub access_key_id: String,

    pub secret_access_key: String,

    /// Presigned URLs expire this many seconds after generation.
    pub presign_expiry_secs: u64,

    /// Object-key prefix for full video files.
    pub video_prefix: String,

    /// Object-key prefix for poster artwork.
    pub poster_prefix: String,

    /// Object-key prefix for user profile images.
    pub profile_image_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            bucket: "streamvault-media".to_string(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            presign_expiry_secs: 30,
            video_prefix: "movies/full_trailer".to_string(),
            poster_prefix: "movies/posters".to_string(),
            profile_image_prefix: "users/profile_images".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            security: SecurityConfig::default(),
            storage: StorageConfig::default(),
            observability: ObservabilityConfig::default(),
            jwt_secret: String::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;

        config.jwt_secret = std::env::var(JWT_SECRET_ENV)
            .with_context(|| format!("{JWT_SECRET_ENV} must be set in the environment"))?;

        config.validate()?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("streamvault").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".streamvault").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.is_empty() {
            anyhow::bail!("Token-signing secret cannot be empty");
        }

        if self.general.database_path.is_empty() {
            anyhow::bail!("Database path cannot be empty");
        }

        if self.security.argon2_memory_cost_kib == 0
            || self.security.argon2_time_cost == 0
            || self.security.argon2_parallelism == 0
        {
            anyhow::bail!("Argon2 cost parameters must all be non-zero");
        }

        if self.storage.presign_expiry_secs == 0 {
            anyhow::bail!("Presign expiry must be non-zero");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_apart_from_secret() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.jwt_secret = "fixture-secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_argon2_costs() {
        let mut config = Config::default();
        config.jwt_secret = "fixture-secret".to_string();
        config.security.argon2_time_cost = 0;
        assert!(config.validate().is_err());
    }
}
