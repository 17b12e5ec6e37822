use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StackchatConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub tui: TuiConfig,
}

/// Which field name the login endpoint expects for the account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoginField {
    #[default]
    Email,
    Username,
}

impl LoginField {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginField::Email => "email",
            LoginField::Username => "username",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// No timeout unless set.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub login_field: LoginField,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive such as `debug` or `stackchat_core=debug`. Unset
    /// means each binary picks its own default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(default)]
    pub json_format: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub color: bool,

    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,

    #[serde(default = "default_typing_speed")]
    pub typing_speed_ms: u64,

    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_poll_interval() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_datetime_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

fn default_tick_rate() -> u64 {
    250
}

fn default_typing_speed() -> u64 {
    20
}

fn default_theme() -> String {
    "violet".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            request_timeout_secs: None,
            login_field: LoginField::default(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            json_format: false,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            datetime_format: default_datetime_format(),
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            typing_speed_ms: default_typing_speed(),
            theme: default_theme(),
        }
    }
}

impl ApiConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl StackchatConfig {
    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_from_paths(get_config_paths())
    }

    pub fn load_from_paths(paths: Vec<PathBuf>) -> Result<Self, ConfigLoadError> {
        load_dotenv_files();

        let mut builder = ConfigBuilder::builder();

        for path in paths {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("STACKCHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;

        let mut stackchat_config: StackchatConfig = config.try_deserialize()?;

        if let Ok(url) = std::env::var("STACKCHAT_API_URL") {
            stackchat_config.api.base_url = url;
        }

        if let Ok(level) = std::env::var("STACKCHAT_LOG_LEVEL") {
            stackchat_config.logging.level = Some(level);
        }

        if let Ok(interval) = std::env::var("STACKCHAT_POLL_INTERVAL") {
            if let Ok(secs) = interval.parse() {
                stackchat_config.training.poll_interval_secs = secs;
            }
        }

        stackchat_config.validate()?;

        Ok(stackchat_config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigLoadError::MissingRequired("api.base_url".to_string()));
        }

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(ConfigLoadError::InvalidValue {
                key: "api.base_url".to_string(),
                message: "Must start with http:// or https://".to_string(),
            });
        }

        if self.training.poll_interval_secs == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "training.poll_interval_secs".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.tui.tick_rate_ms == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "tui.tick_rate_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if let Some(level) = &self.logging.level {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            let level_lower = level.to_lowercase();
            if !valid_levels.contains(&level_lower.as_str()) && !level_lower.contains('=') {
                return Err(ConfigLoadError::InvalidValue {
                    key: "logging.level".to_string(),
                    message: format!(
                        "Invalid log level '{}'. Must be one of: {:?}",
                        level, valid_levels
                    ),
                });
            }
        }

        Ok(())
    }

    pub fn api_url(&self) -> &str {
        &self.api.base_url
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.training.poll_interval_secs)
    }

    /// Where the session file lives; falls back to the data directory.
    pub fn session_path(&self) -> Option<PathBuf> {
        self.session
            .store_path
            .clone()
            .or_else(|| get_data_dir().map(|d| d.join("session.json")))
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config").join("default.toml"));
        paths.push(cwd.join("config").join("local.toml"));
        paths.push(cwd.join("stackchat.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("stackchat").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".stackchat").join("config.toml"));
    }

    paths
}

fn load_dotenv_files() {
    for path in get_dotenv_paths() {
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}

fn get_dotenv_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".env"));
        paths.push(cwd.join(".env.local"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".stackchat").join(".env"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("stackchat").join(".env"));
    }

    paths
}

pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("stackchat"))
}

pub fn get_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("stackchat"))
}

pub fn ensure_data_dir() -> Result<PathBuf, std::io::Error> {
    let data_dir = get_data_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine data directory",
        )
    })?;

    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
    }

    Ok(data_dir)
}
