use crate::config::types::{Config, FetchConfig, ManageConfig, QueueConfig, WorkerConfig};
use crate::ConfigError;

/// Upper bound on workers started by one invocation
pub const MAX_WORKERS: u32 = 256;

/// Upper bound on followed redirects
pub const MAX_REDIRECTS: usize = 50;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_queue_config(&config.queue)?;
    validate_worker_config(&config.worker)?;
    validate_fetch_config(&config.fetch)?;
    validate_manage_config(&config.manage)?;
    Ok(())
}

/// Validates queue store configuration
fn validate_queue_config(config: &QueueConfig) -> Result<(), ConfigError> {
    if config.database_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "queue connect_timeout_secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates worker lifecycle configuration
fn validate_worker_config(config: &WorkerConfig) -> Result<(), ConfigError> {
    validate_worker_count(config.count)?;

    if config.grace_period_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "grace_period_secs must be >= 1, got {}",
            config.grace_period_secs
        )));
    }

    if config.store_retry_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "store_retry_secs must be >= 1, got {}",
            config.store_retry_secs
        )));
    }

    Ok(())
}

/// Validates a worker count, whether it came from the file or the CLI
pub fn validate_worker_count(count: u32) -> Result<(), ConfigError> {
    if count < 1 || count > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "worker count must be between 1 and {}, got {}",
            MAX_WORKERS, count
        )));
    }
    Ok(())
}

/// Validates HTTP fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.max_redirects > MAX_REDIRECTS {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be <= {}, got {}",
            MAX_REDIRECTS, config.max_redirects
        )));
    }

    Ok(())
}

/// Validates process management configuration
fn validate_manage_config(config: &ManageConfig) -> Result<(), ConfigError> {
    if config.pid_file.as_os_str().is_empty() {
        return Err(ConfigError::Validation("pid_file cannot be empty".to_string()));
    }

    if config.log_file.as_os_str().is_empty() {
        return Err(ConfigError::Validation("log_file cannot be empty".to_string()));
    }

    Ok(())
}
