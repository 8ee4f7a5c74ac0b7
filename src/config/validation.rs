use crate::config::types::{
    Config, CrawlerConfig, ExtractionConfig, OutputConfig, RecordConfig, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Upper bound on `max-pages`, to keep a typo from hammering a site
const MAX_PAGES_LIMIT: u32 = 1000;

/// Upper bound on `pause-seconds`
const MAX_PAUSE_SECONDS: u64 = 300;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_extraction_config(&config.extraction)?;
    validate_record_config(&config.record)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.css_selector.trim().is_empty() {
        return Err(ConfigError::Validation(
            "css_selector cannot be empty".to_string(),
        ));
    }

    if let Err(e) = Selector::parse(&config.css_selector) {
        return Err(ConfigError::Validation(format!(
            "Invalid css_selector '{}': {:?}",
            config.css_selector, e
        )));
    }

    if config.max_pages < 1 || config.max_pages > MAX_PAGES_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_pages must be between 1 and {}, got {}",
            MAX_PAGES_LIMIT, config.max_pages
        )));
    }

    if config.pause_seconds > MAX_PAUSE_SECONDS {
        return Err(ConfigError::Validation(format!(
            "pause_seconds must be <= {}, got {}",
            MAX_PAUSE_SECONDS, config.pause_seconds
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates LLM extraction configuration
fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    match config.provider.split_once('/') {
        Some((vendor, model)) if !vendor.is_empty() && !model.is_empty() => {}
        _ => {
            return Err(ConfigError::Validation(format!(
                "provider must look like 'vendor/model', got '{}'",
                config.provider
            )));
        }
    }

    Url::parse(&config.api_base)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api_base: {}", e)))?;

    if config.api_key_env.is_empty() {
        return Err(ConfigError::Validation(
            "api_key_env cannot be empty".to_string(),
        ));
    }

    if config.instruction.trim().is_empty() {
        return Err(ConfigError::Validation(
            "instruction cannot be empty".to_string(),
        ));
    }

    if config.chunk_token_threshold < 1 {
        return Err(ConfigError::Validation(
            "chunk_token_threshold must be >= 1".to_string(),
        ));
    }

    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(ConfigError::Validation(format!(
            "temperature must be between 0.0 and 2.0, got {}",
            config.temperature
        )));
    }

    if config.max_tokens < 1 {
        return Err(ConfigError::Validation(
            "max_tokens must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates record layout configuration
fn validate_record_config(config: &RecordConfig) -> Result<(), ConfigError> {
    if config.identity_field.is_empty() {
        return Err(ConfigError::Validation(
            "identity_field cannot be empty".to_string(),
        ));
    }

    if config.required_fields.is_empty() {
        return Err(ConfigError::Validation(
            "required_fields must list at least one field".to_string(),
        ));
    }

    if let Some(blank) = config.required_fields.iter().find(|f| f.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "required_fields contains a blank field name: '{}'",
            blank
        )));
    }

    // Records without the identity field would all be dropped
    if !config.required_fields.contains(&config.identity_field) {
        return Err(ConfigError::Validation(format!(
            "identity_field '{}' must be one of required_fields",
            config.identity_field
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
