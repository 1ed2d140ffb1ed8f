use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,

    /// Accounts created on startup when missing.
    pub seed_users: Vec<SeedUser>,
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
            database_path: "sqlite:instance/bloqueos.db".to_string(),
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
    pub host: String,

    pub port: u16,

    /// Whether to set the Secure flag on session cookies.
    /// Leave off when serving plain HTTP on an internal network.
    pub secure_cookies: bool,

    /// Sessions expire after this many minutes without a request.
    pub session_inactivity_minutes: i64,

    /// How often expired session rows are purged from the database.
    pub session_cleanup_interval_seconds: u64,

    /// Extra origins allowed to serve scripts, e.g. the CDN hosting the
    /// charting library. Same-origin scripts are always allowed.
    pub script_sources: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            secure_cookies: false,
            session_inactivity_minutes: 60,
            session_cleanup_interval_seconds: 60,
            script_sources: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
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

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Install the Prometheus recorder and expose `/admin/metrics`.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedUser {
    pub username: String,

    pub password: String,

    #[serde(default)]
    pub is_admin: bool,
}

impl SeedUser {
    fn new(username: &str, password: &str, is_admin: bool) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            is_admin,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            security: SecurityConfig::default(),
            observability: ObservabilityConfig::default(),
            seed_users: vec![
                SeedUser::new("admin", "admin123", true),
                SeedUser::new("usuario1", "password123", false),
                SeedUser::new("operador", "operador123", false),
            ],
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
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

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("bloqueos").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".bloqueos").join("config.toml"));
        }

        paths
    }

    #[must_use]
    pub fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.trim().is_empty() {
            anyhow::bail!("Database path cannot be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port must be > 0");
        }

        if self.server.session_inactivity_minutes <= 0 {
            anyhow::bail!("Session inactivity timeout must be > 0 minutes");
        }

        if self.server.session_cleanup_interval_seconds == 0 {
            anyhow::bail!("Session cleanup interval must be > 0 seconds");
        }

        for source in &self.server.script_sources {
            if source.is_empty()
                || !source
                    .chars()
                    .all(|c| c.is_ascii_graphic() && c != ';' && c != ',')
            {
                anyhow::bail!("Invalid script source: {source:?}");
            }
        }

        argon2::Params::new(
            self.security.argon2_memory_cost_kib,
            self.security.argon2_time_cost,
            self.security.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

        let mut seen = HashSet::new();
        for seed in &self.seed_users {
            if seed.username.trim().is_empty() || seed.password.is_empty() {
                anyhow::bail!("Seed users need a username and a password");
            }
            if !seen.insert(seed.username.as_str()) {
                anyhow::bail!("Duplicate seed user: {}", seed.username);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.general.database_path, "sqlite:instance/bloqueos.db");
        assert_eq!(config.seed_users.len(), 3);
        assert!(config.seed_users[0].is_admin);
        assert!(!config.seed_users[1].is_admin);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[[seed_users]]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [server]
            port = 8080

            [[seed_users]]
            username = "jefe"
            password = "secreto"
            is_admin = true
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(
            config.seed_users,
            vec![SeedUser::new("jefe", "secreto", true)]
        );
    }

    #[test]
    fn test_validate_rejects_duplicate_seed_users() {
        let mut config = Config::default();
        config
            .seed_users
            .push(SeedUser::new("admin", "otra", false));

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate seed user"));
    }

    #[test]
    fn test_validate_script_sources() {
        let mut config = Config::default();
        config.server.script_sources = vec!["https://cdn.jsdelivr.net".to_string()];
        assert!(config.validate().is_ok());

        for bad in ["", "https://a.example; script-src *", "https://a.example b"] {
            config.server.script_sources = vec![bad.to_string()];
            assert!(config.validate().is_err(), "{bad}");
        }
    }

    #[test]
    fn test_validate_rejects_zero_cleanup_interval() {
        let mut config = Config::default();
        config.server.session_cleanup_interval_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_argon2_params() {
        let mut config = Config::default();
        config.security.argon2_time_cost = 0;
        assert!(config.validate().is_err());
    }
}
