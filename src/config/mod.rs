use crate::constants::{
    DEFAULT_BATTLE_FLAIR, DEFAULT_HTTP_TIMEOUT_SECONDS, DEFAULT_POLL_API_URL,
    DEFAULT_POLL_BASE_URL, DEFAULT_POST_DELAY_SECONDS, DEFAULT_REFRESH_INTERVAL_SECONDS,
    DEFAULT_SUBMISSION_LIMIT, DEFAULT_SUBREDDIT, ENV_PREFIX,
};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

pub mod paths;
pub mod validation;

use paths::{get_config_path, get_database_path, get_log_dir_path};
use validation::validate_config;

/// Bot configuration, stored as TOML.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Reddit script app client id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Reddit script app client secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Reddit account the bot posts as
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Subreddit to watch, without the `/r/` prefix
    #[serde(default = "default_subreddit")]
    pub subreddit: String,
    /// Flair substring identifying battle posts
    #[serde(default = "default_battle_flair")]
    pub battle_flair: String,
    /// Seconds to sleep between fetch cycles
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
    /// Number of newest posts examined per cycle
    #[serde(default = "default_submission_limit")]
    pub submission_limit: u32,
    /// Seconds to pause after each posted poll
    #[serde(default = "default_post_delay")]
    pub post_delay_seconds: u64,
    /// Poll creation endpoint
    #[serde(default = "default_poll_api_url")]
    pub poll_api_url: String,
    /// Base of the voting URL linked in replies
    #[serde(default = "default_poll_base_url")]
    pub poll_base_url: String,
    /// Path to the dedup database. Defaults to the config directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
    /// Path to the log file. If not specified, logs will be written to a default location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    /// HTTP timeout in seconds for API requests
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
}

fn default_subreddit() -> String {
    DEFAULT_SUBREDDIT.to_string()
}

fn default_battle_flair() -> String {
    DEFAULT_BATTLE_FLAIR.to_string()
}

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECONDS
}

fn default_submission_limit() -> u32 {
    DEFAULT_SUBMISSION_LIMIT
}

fn default_post_delay() -> u64 {
    DEFAULT_POST_DELAY_SECONDS
}

fn default_poll_api_url() -> String {
    DEFAULT_POLL_API_URL.to_string()
}

fn default_poll_base_url() -> String {
    DEFAULT_POLL_BASE_URL.to_string()
}

fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECONDS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            client_id: None,
            client_secret: None,
            username: None,
            password: None,
            subreddit: default_subreddit(),
            battle_flair: default_battle_flair(),
            refresh_interval_seconds: default_refresh_interval(),
            submission_limit: default_submission_limit(),
            post_delay_seconds: default_post_delay(),
            poll_api_url: default_poll_api_url(),
            poll_base_url: default_poll_base_url(),
            database_path: None,
            log_file_path: None,
            http_timeout_seconds: default_http_timeout(),
        }
    }
}

impl Config {
    /// Loads configuration from `custom_path` or the default location.
    /// If no config file exists, one with default settings is written first.
    /// Environment variables override file values.
    ///
    /// # Environment Variables
    /// - `BATTLE_BOT_CLIENT_ID`, `BATTLE_BOT_CLIENT_SECRET`
    /// - `BATTLE_BOT_USERNAME`, `BATTLE_BOT_PASSWORD`
    /// - `BATTLE_BOT_SUBREDDIT`
    /// - `BATTLE_BOT_HTTP_TIMEOUT` - HTTP timeout in seconds
    ///
    /// # Errors
    /// * `AppError::MissingCredentials` - Any Reddit credential is absent
    /// * `AppError::Config` - Another setting is invalid
    pub async fn load(custom_path: Option<&str>) -> Result<Self, AppError> {
        let config_path = custom_path
            .map(str::to_string)
            .unwrap_or_else(get_config_path);

        let mut config = Self::load_or_create(&config_path).await?;
        config.apply_overrides(|name| std::env::var(name).ok());
        validate_config(&config, &config_path)?;

        Ok(config)
    }

    /// Reads the config file, writing the defaults there first if it is missing.
    /// Does not validate.
    pub async fn load_or_create(path: &str) -> Result<Self, AppError> {
        if Path::new(path).exists() {
            Self::load_from_path(path).await
        } else {
            let config = Config::default();
            config.save_to_path(path).await?;
            info!("Wrote default configuration to {path}");
            Ok(config)
        }
    }

    /// Loads configuration from a file path without validation or overrides.
    pub async fn load_from_path(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Applies `BATTLE_BOT_*` overrides using `lookup` to read variables.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(value) = var("CLIENT_ID") {
            self.client_id = Some(value);
        }
        if let Some(value) = var("CLIENT_SECRET") {
            self.client_secret = Some(value);
        }
        if let Some(value) = var("USERNAME") {
            self.username = Some(value);
        }
        if let Some(value) = var("PASSWORD") {
            self.password = Some(value);
        }
        if let Some(value) = var("SUBREDDIT") {
            self.subreddit = value;
        }
        if let Some(timeout) = var("HTTP_TIMEOUT").and_then(|s| s.parse::<u64>().ok()) {
            self.http_timeout_seconds = timeout;
        }
    }

    /// Validates the configuration settings
    pub fn validate(&self, config_path: &str) -> Result<(), AppError> {
        validate_config(self, config_path)
    }

    /// Saves configuration to a file path, creating the parent directory if needed.
    ///
    /// # Errors
    /// * `AppError::Config` - If the provided path has no parent directory
    /// * `AppError::Io` - If there's an I/O error creating directories or writing the file
    /// * `AppError::TomlSerialize` - If there's an error serializing the configuration
    pub async fn save_to_path(&self, path: &str) -> Result<(), AppError> {
        let config_dir = Path::new(path).parent().ok_or_else(|| {
            AppError::config_error(format!("Path '{path}' has no parent directory"))
        })?;

        if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
            fs::create_dir_all(config_dir).await?;
        }
        let content = toml::to_string_pretty(self)?;
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Returns the platform-specific path for the config file.
    pub fn get_config_path() -> String {
        get_config_path()
    }

    /// Returns the platform-specific path for the log directory.
    pub fn get_log_dir_path() -> String {
        get_log_dir_path()
    }

    /// Path of the dedup database, falling back to the config directory.
    pub fn database_path(&self) -> String {
        self.database_path.clone().unwrap_or_else(get_database_path)
    }

    /// Displays current configuration settings to stdout. Secrets are masked.
    pub async fn display(custom_path: Option<&str>) -> Result<(), AppError> {
        let config_path = custom_path
            .map(str::to_string)
            .unwrap_or_else(get_config_path);

        if !Path::new(&config_path).exists() {
            println!("\nNo configuration file found at:");
            println!("{config_path}");
            return Ok(());
        }

        let mut config = Self::load_from_path(&config_path).await?;
        config.apply_overrides(|name| std::env::var(name).ok());

        let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "(not set)".to_string());
        let mask = |value: &Option<String>| match value {
            Some(_) => "********".to_string(),
            None => "(not set)".to_string(),
        };

        println!("\nCurrent Configuration");
        println!("────────────────────────────────────");
        println!("Config Location:     {config_path}");
        println!("Subreddit:           /r/{}", config.subreddit);
        println!("Battle Flair:        {}", config.battle_flair);
        println!("Client ID:           {}", show(&config.client_id));
        println!("Client Secret:       {}", mask(&config.client_secret));
        println!("Username:            {}", show(&config.username));
        println!("Password:            {}", mask(&config.password));
        println!("Refresh Interval:    {} seconds", config.refresh_interval_seconds);
        println!("Submission Limit:    {}", config.submission_limit);
        println!("Post Delay:          {} seconds", config.post_delay_seconds);
        println!("Poll API:            {}", config.poll_api_url);
        println!("Poll Base URL:       {}", config.poll_base_url);
        println!("Database:            {}", config.database_path());
        println!("HTTP Timeout:        {} seconds", config.http_timeout_seconds);
        match &config.log_file_path {
            Some(custom) => println!("Log File:            {custom}"),
            None => println!(
                "Log File:            {}/{} (default)",
                get_log_dir_path(),
                crate::constants::LOG_FILE_NAME
            ),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_config_load_existing_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let config_content = r#"
client_id = "abc"
client_secret = "def"
username = "BattleBot"
password = "hunter2"
subreddit = "battlerap"
submission_limit = 25
"#;
        tokio::fs::write(&config_path, config_content).await.unwrap();

        let config = Config::load(config_path.to_str())
            .await
            .unwrap();

        assert_eq!(config.client_id.as_deref(), Some("abc"));
        assert_eq!(config.subreddit, "battlerap");
        assert_eq!(config.submission_limit, 25);
        assert_eq!(config.refresh_interval_seconds, DEFAULT_REFRESH_INTERVAL_SECONDS);
        assert_eq!(config.battle_flair, "BATTLE");
    }

    #[tokio::test]
    async fn test_missing_file_writes_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");
        let config_path_str = config_path.to_string_lossy().to_string();

        let config = Config::load_or_create(&config_path_str).await.unwrap();
        assert_eq!(config, Config::default());
        assert!(config_path.exists());

        let content = tokio::fs::read_to_string(&config_path).await.unwrap();
        assert!(content.contains("refresh_interval_seconds = 60"));
        assert!(content.contains("submission_limit = 50"));
        assert!(!content.contains("password"));
    }

    #[tokio::test]
    async fn test_defaults_file_fails_on_missing_credentials() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let config_path_str = config_path.to_string_lossy().to_string();

        let mut config = Config::load_or_create(&config_path_str).await.unwrap();
        config.apply_overrides(|_| None);
        let err = config.validate(&config_path_str).unwrap_err();
        assert!(matches!(err, AppError::MissingCredentials { .. }));
        assert!(err.to_string().contains("client_id, client_secret, username, password"));
    }

    #[tokio::test]
    async fn test_config_save_and_load_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let config_path_str = config_path.to_string_lossy();
        let original = Config {
            client_id: Some("abc".to_string()),
            log_file_path: Some("/custom/log/path".to_string()),
            post_delay_seconds: 2,
            ..Config::default()
        };
        original.save_to_path(&config_path_str).await.unwrap();
        let loaded = Config::load_from_path(&config_path_str).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_config_load_invalid_toml() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        tokio::fs::write(&config_path, "client_id = [1, 2, \"unclosed")
            .await
            .unwrap();
        let result = Config::load_from_path(&config_path.to_string_lossy()).await;
        assert!(matches!(result, Err(AppError::TomlDeserialize(_))));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("BATTLE_BOT_CLIENT_ID", "env-id"),
            ("BATTLE_BOT_PASSWORD", "env-pass"),
            ("BATTLE_BOT_SUBREDDIT", "rbc"),
            ("BATTLE_BOT_HTTP_TIMEOUT", "12"),
        ]);
        let mut config = Config {
            client_id: Some("file-id".to_string()),
            username: Some("file-user".to_string()),
            ..Config::default()
        };
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.client_id.as_deref(), Some("env-id"));
        assert_eq!(config.username.as_deref(), Some("file-user"));
        assert_eq!(config.password.as_deref(), Some("env-pass"));
        assert_eq!(config.subreddit, "rbc");
        assert_eq!(config.http_timeout_seconds, 12);
    }

    #[test]
    fn test_unparseable_timeout_override_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|name| {
            (name == "BATTLE_BOT_HTTP_TIMEOUT").then(|| "soon".to_string())
        });
        assert_eq!(config.http_timeout_seconds, DEFAULT_HTTP_TIMEOUT_SECONDS);
    }

    #[test]
    fn test_database_path_defaults_to_config_dir() {
        let config = Config::default();
        assert!(config.database_path().ends_with("battle_poll_bot.db"));

        let config = Config {
            database_path: Some("/tmp/polls.db".to_string()),
            ..Config::default()
        };
        assert_eq!(config.database_path(), "/tmp/polls.db");
    }

    #[tokio::test]
    async fn test_display_without_config_file() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("none.toml");
        let result = Config::display(missing.to_str()).await;
        assert!(result.is_ok());
    }
}
