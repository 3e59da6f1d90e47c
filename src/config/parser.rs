use crate::config::types::CrawlerConfig;
use crate::ConfigError;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Loads the crawl configuration from the given path
///
/// A missing, unreadable, or malformed file never fails the caller: the error
/// is logged and [`CrawlerConfig::default`] is returned instead.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use wordcrawl::config::load_config;
///
/// let config = load_config(Path::new("crawl.json"));
/// println!("Max depth: {}", config.max_depth);
/// ```
pub fn load_config(path: &Path) -> CrawlerConfig {
    match try_load_config(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                "Failed to load configuration from {}, using defaults: {}",
                path.display(),
                e
            );
            CrawlerConfig::default()
        }
    }
}

/// Reads the crawl configuration from any JSON source, falling back to defaults
pub fn read_config<R: Read>(reader: R) -> CrawlerConfig {
    match try_read_config(reader) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to parse configuration, using defaults: {}", e);
            CrawlerConfig::default()
        }
    }
}

/// Loads the crawl configuration, reporting why it could not be read
pub fn try_load_config(path: &Path) -> Result<CrawlerConfig, ConfigError> {
    let file = File::open(path)?;
    try_read_config(BufReader::new(file))
}

/// Parses the crawl configuration, reporting why it could not be parsed
pub fn try_read_config<R: Read>(reader: R) -> Result<CrawlerConfig, ConfigError> {
    Ok(serde_json::from_reader(reader)?)
}
