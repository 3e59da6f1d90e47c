//! Wordcrawl: the concurrent traversal core of a bounded web crawler
//!
//! This crate fans a crawl out as a tree of fork-join tasks, tallies the words
//! seen on every visited page into one shared aggregate, and stops following
//! links at a depth budget, a wall-clock deadline, or an ignored URL pattern.
//! Fetching and parsing pages is left to the embedding application through the
//! [`crawler::PageParser`] trait.

pub mod clock;
pub mod config;
pub mod crawler;
pub mod output;
pub mod profiler;
pub mod state;

use thiserror::Error;

/// Main error type for a crawl invocation
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Crawl task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Failed to start task pool: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Errors raised by a [`crawler::PageParser`] while fetching or parsing a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },

    #[error("Failed to parse page {url}: {message}")]
    Parse { url: String, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Profiler errors
#[derive(Debug, Error)]
pub enum ProfilerError {
    #[error("{type_name} does not declare any timed operations")]
    NoTimedOperations { type_name: &'static str },

    #[error("Failed to write profile report: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{load_config, CrawlerConfig, DepthPolicy};
pub use crawler::{Coordinator, CrawlTask, PageParser, ParsedPage};
pub use output::CrawlResult;
pub use profiler::{Profiler, Timed, TimedOperations};
pub use state::CrawlState;
