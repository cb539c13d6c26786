use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ApiError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "server/config/server.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Inputs of the mode controller. Read once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub vulnerable: bool,
    pub token_ttl_seconds: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            vulnerable: true,
            token_ttl_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/vulnapi.db".to_string(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// On-disk location of a file-backed SQLite URL. `None` for memory databases.
    pub fn file_path(&self) -> Option<PathBuf> {
        let rest = self
            .url
            .strip_prefix("sqlite://")
            .or_else(|| self.url.strip_prefix("sqlite:"))?;
        let path = rest.split('?').next().unwrap_or(rest);
        if path.is_empty() || path == ":memory:" {
            return None;
        }
        Some(PathBuf::from(path))
    }
}

/// Size of the sample population written by `/createdb` and at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    pub users: usize,
    pub books_per_user: usize,
    #[serde(default = "default_populate_on_start")]
    pub populate_on_start: bool,
}

fn default_populate_on_start() -> bool {
    true
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            users: 20,
            books_per_user: 5,
            populate_on_start: default_populate_on_start(),
        }
    }
}

impl ServerConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ApiError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ServerConfig = toml::from_str(content)
            .map_err(|e| ApiError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// File (when present) layered under the process environment.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            log::warn!(
                "Config file '{}' not found, using built-in defaults",
                path.display()
            );
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("VULNERABLE") {
            self.security.vulnerable = parse_flag("VULNERABLE", &raw)?;
        }
        if let Some(raw) = lookup("TOKEN_TTL_SECONDS") {
            self.security.token_ttl_seconds = parse_number("TOKEN_TTL_SECONDS", &raw)?;
        }
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(raw) = lookup("SERVER_PORT") {
            self.server.port = parse_number("SERVER_PORT", &raw)?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(raw) = lookup("BOOTSTRAP_USERS") {
            self.bootstrap.users = parse_number("BOOTSTRAP_USERS", &raw)?;
        }
        if let Some(raw) = lookup("BOOTSTRAP_BOOKS_PER_USER") {
            self.bootstrap.books_per_user = parse_number("BOOTSTRAP_BOOKS_PER_USER", &raw)?;
        }
        if let Some(raw) = lookup("BOOTSTRAP_ON_START") {
            self.bootstrap.populate_on_start = parse_flag("BOOTSTRAP_ON_START", &raw)?;
        }

        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.security.token_ttl_seconds == 0 {
            return Err(ApiError::Config(
                "token_ttl_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ApiError::Config(format!(
            "{} must be a boolean flag, got '{}'",
            key, other
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::Config(format!("{} must be a number, got '{}'", key, raw)))
}
