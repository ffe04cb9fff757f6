use super::Config;
use crate::constants::MAX_SUBMISSION_LIMIT;
use crate::error::AppError;
use std::path::Path;

/// Returns the names of required credentials that are absent or blank.
pub fn missing_credentials(config: &Config) -> Vec<String> {
    [
        ("client_id", &config.client_id),
        ("client_secret", &config.client_secret),
        ("username", &config.username),
        ("password", &config.password),
    ]
    .into_iter()
    .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
    .map(|(name, _)| name.to_string())
    .collect()
}

/// Validates the configuration settings
///
/// # Arguments
/// * `config` - The configuration to validate
/// * `config_path` - Where the configuration was loaded from, used in error messages
///
/// # Validation Rules
/// - Reddit credentials must all be present
/// - Subreddit and battle flair cannot be empty
/// - Refresh interval must be positive
/// - Submission limit must be between 1 and the Reddit listing maximum
/// - Poll URLs must use http or https
/// - Log file parent directory must exist or be creatable
pub fn validate_config(config: &Config, config_path: &str) -> Result<(), AppError> {
    let missing = missing_credentials(config);
    if !missing.is_empty() {
        return Err(AppError::missing_credentials(config_path, missing));
    }

    if config.subreddit.trim().is_empty() {
        return Err(AppError::config_error("Subreddit cannot be empty"));
    }

    if config.battle_flair.is_empty() {
        return Err(AppError::config_error("Battle flair marker cannot be empty"));
    }

    if config.refresh_interval_seconds == 0 {
        return Err(AppError::config_error(
            "Refresh interval must be at least one second",
        ));
    }

    if config.submission_limit == 0 || config.submission_limit > MAX_SUBMISSION_LIMIT {
        return Err(AppError::config_error(format!(
            "Submission limit must be between 1 and {MAX_SUBMISSION_LIMIT}"
        )));
    }

    if config.http_timeout_seconds == 0 {
        return Err(AppError::config_error("HTTP timeout must be at least one second"));
    }

    for (name, url) in [
        ("poll_api_url", &config.poll_api_url),
        ("poll_base_url", &config.poll_base_url),
    ] {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::config_error(format!(
                "{name} must start with http:// or https://"
            )));
        }
    }

    if let Some(log_path) = &config.log_file_path {
        if log_path.is_empty() {
            return Err(AppError::config_error("Log file path cannot be empty"));
        }

        if let Some(parent) = Path::new(log_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config_error(format!(
                    "Cannot create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}
