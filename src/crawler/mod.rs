//! Crawler module for concurrent link traversal
//!
//! This module contains the core crawling logic, including:
//! - The page parsing capability and its ignored-words filter
//! - The recursive fork-join crawl task
//! - Overall crawl coordination on the task pool

mod coordinator;
mod parser;
mod task;

pub use coordinator::{CrawlOptions, Coordinator};
pub use parser::{PageParser, ParsedPage, WordFilter};
pub use task::CrawlTask;

use crate::clock::SystemClock;
use crate::config::CrawlerConfig;
use crate::output::CrawlResult;
use crate::CrawlError;
use std::sync::Arc;

/// Runs a complete crawl described by a configuration document
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration
/// 2. Build the worker pool sized by `parallelism`
/// 3. Crawl from every starting URL
/// 4. Return the aggregate word counts
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use wordcrawl::config::load_config;
/// use wordcrawl::crawler::{run_crawl, PageParser, ParsedPage};
/// use wordcrawl::FetchError;
///
/// struct MyParser;
///
/// #[async_trait::async_trait]
/// impl PageParser for MyParser {
///     async fn parse(&self, url: &str) -> Result<ParsedPage, FetchError> {
///         Ok(ParsedPage::default())
///     }
/// }
///
/// let config = load_config(Path::new("crawl.json"));
/// let result = run_crawl(&config, MyParser).unwrap();
/// for (word, count) in result.popular_words(config.popular_word_count) {
///     println!("{}: {}", word, count);
/// }
/// ```
pub fn run_crawl<P>(config: &CrawlerConfig, parser: P) -> Result<CrawlResult, CrawlError>
where
    P: PageParser + 'static,
{
    let coordinator = Coordinator::from_config(config, parser, Arc::new(SystemClock))?;
    coordinator.crawl_blocking(config.starting_urls.iter().cloned())
}
