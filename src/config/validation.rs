use crate::config::types::CrawlerConfig;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Loading never fails, so this is where a caller finds out that a pattern
/// does not compile or a starting URL is not a web address.
pub fn validate(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_starting_urls(&config.starting_urls)?;
    config.ignored_url_patterns()?;
    config.ignored_word_patterns()?;
    Ok(())
}

/// Validates starting URLs
fn validate_starting_urls(urls: &[String]) -> Result<(), ConfigError> {
    for raw in urls {
        let url = Url::parse(raw).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid starting URL '{}': {}", raw, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Starting URL '{}' must use HTTP or HTTPS scheme",
                raw
            )));
        }
    }

    Ok(())
}
