use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub identity: IdentityConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub portal: PortalConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

/// Hosted identity provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the GoTrue-compatible auth API, e.g. `https://xyz.supabase.co/auth/v1`
    pub url: String,

    /// Public (anon) API key sent with every request
    pub anon_key: String,

    /// Where sign-up confirmation emails send the user back to
    #[serde(default)]
    pub redirect_url: Option<String>,

    /// Where password recovery emails send the user back to
    #[serde(default)]
    pub reset_redirect_url: Option<String>,

    #[serde(default = "default_identity_timeout")]
    pub request_timeout_secs: u64,
}

impl IdentityConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Local session persistence.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// File the active session is written to. Sessions stay in memory when unset.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
    Compact,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// Entries returned by an activity history lookup
    #[serde(default = "default_activity_history_limit")]
    pub activity_history_limit: i64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            activity_history_limit: default_activity_history_limit(),
        }
    }
}

// Default value functions
fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    1
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_identity_timeout() -> u64 {
    15
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_activity_history_limit() -> i64 {
    domain::models::activity::DEFAULT_HISTORY_LIMIT
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with PORTAL__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("PORTAL").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds entirely from embedded defaults and overrides so tests do not
    /// depend on config files.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [database]
            url = ""
            max_connections = 10
            min_connections = 1
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [identity]
            url = "http://localhost:9999"
            anon_key = "test-anon-key"
            redirect_url = "http://localhost:3000"
            reset_redirect_url = "http://localhost:3000/reset-password"
            request_timeout_secs = 15

            [logging]
            level = "info"
            format = "json"

            [portal]
            activity_history_limit = 50
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        // Validation is left to the caller so tests can build partial configs.
        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "PORTAL__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.identity.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "PORTAL__IDENTITY__URL environment variable must be set".to_string(),
            ));
        }

        if let Err(e) = url::Url::parse(&self.identity.url) {
            return Err(ConfigValidationError::InvalidValue(format!(
                "identity.url is not a valid URL: {}",
                e
            )));
        }

        if self.identity.anon_key.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "PORTAL__IDENTITY__ANON_KEY environment variable must be set".to_string(),
            ));
        }

        if self.identity.request_timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "identity.request_timeout_secs cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.portal.activity_history_limit <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "portal.activity_history_limit must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
