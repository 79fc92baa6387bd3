use crate::config::types::{Config, CrawlerConfig, OutputConfig, PageLimit, RunConfig};
use crate::{ConfigError, HarvestError};

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.default_page_cap < 1 {
        return Err(ConfigError::Validation(format!(
            "default_page_cap must be >= 1, got {}",
            config.default_page_cap
        )));
    }

    if config.max_workers < 1 || config.max_workers > 100 {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and 100, got {}",
            config.max_workers
        )));
    }

    if config.pages_per_worker < 1 {
        return Err(ConfigError::Validation(format!(
            "pages_per_worker must be >= 1, got {}",
            config.pages_per_worker
        )));
    }

    if config.request_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.storage_root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "storage_root cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the per-run configuration before any network activity
pub fn validate_run_config(run: &RunConfig) -> Result<(), HarvestError> {
    if run.url.trim().is_empty() {
        return Err(HarvestError::InvalidInput("URL cannot be empty".to_string()));
    }

    if run.page_limit == PageLimit::Capped(0) {
        return Err(HarvestError::InvalidInput(
            "number of pages must be at least 1".to_string(),
        ));
    }

    Ok(())
}
