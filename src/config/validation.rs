use crate::config::types::{Config, ElasticConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_elastic_config(&config.elastic)?;
    validate_seed_urls(&config.url_list)?;
    validate_crawler_settings(config)?;
    Ok(())
}

/// Validates index store settings
fn validate_elastic_config(config: &ElasticConfig) -> Result<(), ConfigError> {
    validate_http_url(&config.uri)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid elastic uri: {}", e)))?;

    if config.index_name.is_empty() {
        return Err(ConfigError::Validation(
            "indexName cannot be empty".to_string(),
        ));
    }

    // Elasticsearch rejects index names with uppercase letters
    if config.index_name.chars().any(|c| c.is_uppercase()) {
        return Err(ConfigError::Validation(format!(
            "indexName must be lowercase, got '{}'",
            config.index_name
        )));
    }

    if config.bulk_size < 1 {
        return Err(ConfigError::Validation(format!(
            "bulkSize must be >= 1, got {}",
            config.bulk_size
        )));
    }

    if config.password.is_some() && config.user.is_none() {
        return Err(ConfigError::Validation(
            "password is set but user is missing".to_string(),
        ));
    }

    Ok(())
}

/// Validates the seed URL list
fn validate_seed_urls(seeds: &[String]) -> Result<(), ConfigError> {
    if seeds.is_empty() {
        return Err(ConfigError::Validation(
            "urlList must contain at least one seed URL".to_string(),
        ));
    }

    for seed in seeds {
        validate_http_url(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;
    }

    Ok(())
}

/// Validates concurrency, retry and timeout settings
fn validate_crawler_settings(config: &Config) -> Result<(), ConfigError> {
    if config.number_of_concurrent_tasks < 1 {
        return Err(ConfigError::Validation(format!(
            "numberOfConcurrentTasks must be >= 1, got {}",
            config.number_of_concurrent_tasks
        )));
    }

    if config.max_fetch_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "maxFetchAttempts must be >= 1, got {}",
            config.max_fetch_attempts
        )));
    }

    if config.fetch_timeout_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "fetchTimeoutSeconds must be >= 1, got {}",
            config.fetch_timeout_seconds
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "userAgent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Checks that a string is an absolute http(s) URL
fn validate_http_url(value: &str) -> Result<Url, String> {
    let url = Url::parse(value).map_err(|e| e.to_string())?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!("scheme must be http or https, got {}", url.scheme()));
    }

    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }

    Ok(url)
}
