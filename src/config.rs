//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::admin::auth::DEFAULT_ADMIN_PASSWORD;
use crate::content::engine::ContentStore;
use crate::content::local::{LocalStore, DEFAULT_QUOTA_BYTES};
use crate::content::remote::{
    HostedTableClient, RemoteConfig as RemoteClientConfig, RemoteError, RemoteStore,
    PLACEHOLDER_URL,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Local store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_quota")]
    pub local_quota_bytes: usize,

    /// Watch the local entry for writes by other processes
    #[serde(default = "default_true")]
    pub watch_local: bool,

    #[serde(default = "default_watch_interval")]
    pub watch_interval_ms: u64,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("eventpro").to_string_lossy().to_string())
        .unwrap_or_else(|| "./eventpro_data".to_string())
}

fn default_quota() -> usize {
    DEFAULT_QUOTA_BYTES
}

fn default_true() -> bool {
    true
}

fn default_watch_interval() -> u64 {
    2000
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            local_quota_bytes: default_quota(),
            watch_local: default_true(),
            watch_interval_ms: default_watch_interval(),
        }
    }
}

impl StorageConfig {
    /// Data directory with a leading `~/` expanded
    pub fn data_path(&self) -> PathBuf {
        match self.data_dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.data_dir)),
            None => PathBuf::from(&self.data_dir),
        }
    }

    pub fn local_store(&self) -> LocalStore {
        LocalStore::new(self.data_path(), self.local_quota_bytes)
    }
}

/// Hosted content table configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_remote_url")]
    pub url: String,

    #[serde(default)]
    pub anon_key: String,

    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default = "default_row_id")]
    pub row_id: i64,

    #[serde(default = "default_remote_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// How often to poll the row for changes by other writers; 0 disables
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_remote_url() -> String {
    PLACEHOLDER_URL.to_string()
}

fn default_table() -> String {
    "site_content".to_string()
}

fn default_row_id() -> i64 {
    1
}

fn default_remote_timeout() -> u64 {
    5000
}

fn default_max_retries() -> u32 {
    3
}

fn default_poll_interval() -> u64 {
    30
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_remote_url(),
            anon_key: String::new(),
            table: default_table(),
            row_id: default_row_id(),
            request_timeout_ms: default_remote_timeout(),
            max_retries: default_max_retries(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl RemoteConfig {
    /// Client settings, or `None` when the remote store is not in use
    pub fn client_config(&self) -> Option<RemoteClientConfig> {
        let config = RemoteClientConfig {
            url: self.url.clone(),
            anon_key: self.anon_key.clone(),
            table: self.table.clone(),
            row_id: self.row_id,
            request_timeout_ms: self.request_timeout_ms,
            max_retries: self.max_retries,
        };
        (self.enabled && config.is_configured()).then_some(config)
    }
}

impl Config {
    /// Content store for this configuration: remote-authoritative when a
    /// hosted table is configured, local-only otherwise
    pub fn open_store(&self) -> Result<ContentStore, RemoteError> {
        let local = self.storage.local_store();
        match self.remote.client_config() {
            Some(client_config) => {
                let client: Arc<dyn RemoteStore> = Arc::new(HostedTableClient::new(client_config)?);
                Ok(ContentStore::new(local, Some(client)))
            }
            None => Ok(ContentStore::local_only(local)),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Socket address string to bind
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Admin panel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_password")]
    pub password: String,

    #[serde(default = "default_session_ttl")]
    pub session_ttl_hours: i64,
}

fn default_admin_password() -> String {
    DEFAULT_ADMIN_PASSWORD.to_string()
}

fn default_session_ttl() -> i64 {
    12
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password: default_admin_password(),
            session_ttl_hours: default_session_ttl(),
        }
    }
}

impl AdminConfig {
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("eventpro").join("config.toml")),
            Some(PathBuf::from("/etc/eventpro/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Storage overrides
        if let Some(data_dir) = lookup("EVENTPRO_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }
        if let Some(quota) = lookup("EVENTPRO_LOCAL_QUOTA_BYTES").and_then(|v| v.parse().ok()) {
            self.storage.local_quota_bytes = quota;
        }

        // Remote overrides; a URL turns the remote store on
        if let Some(url) = lookup("EVENTPRO_REMOTE_URL") {
            self.remote.enabled = true;
            self.remote.url = url;
        }
        if let Some(key) = lookup("EVENTPRO_REMOTE_KEY") {
            self.remote.anon_key = key;
        }
        if let Some(table) = lookup("EVENTPRO_REMOTE_TABLE") {
            self.remote.table = table;
        }
        if let Some(secs) = lookup("EVENTPRO_REMOTE_POLL_SECS").and_then(|v| v.parse().ok()) {
            self.remote.poll_interval_secs = secs;
        }

        // API overrides
        if let Some(host) = lookup("EVENTPRO_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("EVENTPRO_API_PORT").and_then(|v| v.parse().ok()) {
            self.api.port = port;
        }

        // Admin overrides
        if let Some(password) = lookup("EVENTPRO_ADMIN_PASSWORD") {
            self.admin.password = password;
        }

        // Logging overrides
        if let Some(level) = lookup("EVENTPRO_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("EVENTPRO_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.port == 0 {
            return Err(ConfigError::Invalid("api.port must be non-zero".to_string()));
        }
        if self.storage.local_quota_bytes == 0 {
            return Err(ConfigError::Invalid(
                "storage.local_quota_bytes must be greater than zero".to_string(),
            ));
        }
        if self.storage.watch_local && self.storage.watch_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "storage.watch_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.admin.password.is_empty() {
            return Err(ConfigError::Invalid(
                "admin.password must not be empty".to_string(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::Invalid(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# EventPro Configuration
#
# Environment variables override these settings:
# - EVENTPRO_DATA_DIR
# - EVENTPRO_LOCAL_QUOTA_BYTES
# - EVENTPRO_REMOTE_URL (also enables the remote store)
# - EVENTPRO_REMOTE_KEY
# - EVENTPRO_REMOTE_TABLE
# - EVENTPRO_REMOTE_POLL_SECS
# - EVENTPRO_API_HOST
# - EVENTPRO_API_PORT
# - EVENTPRO_ADMIN_PASSWORD
# - EVENTPRO_LOG_LEVEL
# - EVENTPRO_LOG_FORMAT

[storage]
# Directory holding the local copy of the site content
data_dir = "~/.local/share/eventpro"

# Largest local entry accepted (bytes)
local_quota_bytes = 5242880

# Notify page renderers when another process rewrites the local copy
watch_local = true
watch_interval_ms = 2000

[remote]
# Use the hosted table as the authoritative store
enabled = false

# Project URL and public anon key
url = "https://your-project-url.supabase.co"
anon_key = ""

# Table and row holding the document
table = "site_content"
row_id = 1

# Request timeout (ms) and write attempts
request_timeout_ms = 5000
max_retries = 3

# Poll for changes made from other devices (seconds, 0 disables)
poll_interval_secs = 30

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins (empty allows any)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

[admin]
# Shared password for the admin panel
password = "admin123"

# How long an admin session lasts (hours)
session_ttl_hours = 12

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
