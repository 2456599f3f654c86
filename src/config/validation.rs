use crate::config::types::{Config, OutputConfig, ProxyConfig, SearchConfig, SelectorConfig};
use crate::ConfigError;
use scraper::Selector;
use std::time::Duration;
use url::Url;

/// Upper bound on result pages for one run
pub const MAX_PAGES: u32 = 100;

/// Upper bound on the proxy timeout, one day
pub const MAX_TIMEOUT_SECS: f64 = 86_400.0;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_proxy_config(&config.proxy)?;
    validate_output_config(&config.output)?;
    validate_selectors(&config.selectors)?;
    Ok(())
}

/// Validates search parameters
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.query.trim().is_empty() {
        return Err(ConfigError::Validation("query cannot be empty".to_string()));
    }

    validate_country(&config.country)?;

    if config.pages < 1 || config.pages > MAX_PAGES {
        return Err(ConfigError::Validation(format!(
            "pages must be between 1 and {}, got {}",
            MAX_PAGES, config.pages
        )));
    }

    Ok(())
}

/// Country codes are two ASCII letters, e.g. `us`, `ca`, `uk`
fn validate_country(country: &str) -> Result<(), ConfigError> {
    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ConfigError::Validation(format!(
            "country must be a two-letter code, got '{}'",
            country
        )));
    }
    Ok(())
}

/// Validates proxy configuration
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    timeout_duration(config)?;

    let endpoint = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy endpoint: {}", e)))?;

    if endpoint.scheme() != "https" && endpoint.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "Proxy endpoint '{}' must use HTTP or HTTPS",
            config.endpoint
        )));
    }

    Ok(())
}

/// Converts the configured timeout into a `Duration`
///
/// Accepts any positive number of seconds up to [`MAX_TIMEOUT_SECS`].
pub fn timeout_duration(config: &ProxyConfig) -> Result<Duration, ConfigError> {
    let secs = config.timeout_secs;
    if !secs.is_finite() || secs <= 0.0 || secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "timeout must be a positive number of seconds up to {}, got {}",
            MAX_TIMEOUT_SECS, secs
        )));
    }

    Duration::try_from_secs_f64(secs).map_err(|e| {
        ConfigError::Validation(format!("timeout of {} seconds is unusable: {}", secs, e))
    })
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Every configured selector has to parse as CSS
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (field, selector) in [
        ("card", &config.card),
        ("title", &config.title),
        ("company", &config.company),
        ("location", &config.location),
        ("summary", &config.summary),
        ("link", &config.link),
    ] {
        parse_selector(field, selector)?;
    }
    Ok(())
}

/// Parses a single CSS selector, naming the field on failure
pub fn parse_selector(field: &'static str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector {
        field,
        selector: selector.to_string(),
    })
}
