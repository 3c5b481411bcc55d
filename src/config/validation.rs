use crate::config::types::{Config, CrawlerConfig, IdentityConfig, OutputConfig};
use crate::url::parse_target;
use crate::ConfigError;

/// Upper bound on concurrent fetches
const MAX_THREADS: usize = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_identity_config(&config.identity)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.target.trim().is_empty() {
        return Err(ConfigError::Validation(
            "target cannot be empty".to_string(),
        ));
    }

    parse_target(&config.target)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid target: {}", e)))?;

    if config.threads < 1 || config.threads > MAX_THREADS {
        return Err(ConfigError::Validation(format!(
            "threads must be between 1 and {}, got {}",
            MAX_THREADS, config.threads
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.max_duration_secs == Some(0) {
        return Err(ConfigError::Validation(
            "max_duration_secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates identity configuration
fn validate_identity_config(config: &IdentityConfig) -> Result<(), ConfigError> {
    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user_agents must contain at least one entry".to_string(),
        ));
    }

    for agent in &config.user_agents {
        if agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user_agents cannot contain empty entries".to_string(),
            ));
        }

        // Must be usable as a header value
        if agent.chars().any(char::is_control) {
            return Err(ConfigError::Validation(format!(
                "user agent contains control characters: {:?}",
                agent
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.export_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "export_path cannot be empty when set".to_string(),
            ));
        }
    }

    if config.progress_interval_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "progress_interval_secs must be >= 1, got {}",
            config.progress_interval_secs
        )));
    }

    Ok(())
}
