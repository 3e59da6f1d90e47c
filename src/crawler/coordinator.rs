//! Crawler coordinator - main crawl orchestration logic
//!
//! This module builds the root crawl tasks and drives them to completion:
//! - Computing the deadline from the configured timeout
//! - Creating a fresh shared state for each invocation
//! - Running one root task per starting URL on the task pool
//! - Returning the final aggregate once every task has joined

use crate::clock::Clock;
use crate::config::{validate, CrawlerConfig, DepthPolicy};
use crate::crawler::parser::{PageParser, WordFilter};
use crate::crawler::task::CrawlTask;
use crate::output::CrawlResult;
use crate::state::CrawlState;
use crate::{ConfigError, CrawlError};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::sync::Arc;

/// Settings that shape a crawl, resolved from the configuration document
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Maximum number of link hops from a starting URL
    pub max_depth: u32,

    /// Time after the crawl starts past which no new page is fetched
    pub timeout: std::time::Duration,

    /// Full-match URL patterns that are never crawled
    pub ignored_urls: Vec<Regex>,

    /// Number of pool workers used by [`Coordinator::crawl_blocking`]
    pub parallelism: usize,

    /// How the depth budget changes on each hop
    pub depth_policy: DepthPolicy,
}

impl CrawlOptions {
    /// Resolves options from a configuration, compiling its URL patterns
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            max_depth: config.max_depth,
            timeout: config.timeout(),
            ignored_urls: config.ignored_url_patterns()?,
            parallelism: config.effective_parallelism(),
            depth_policy: config.depth_policy,
        })
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    options: CrawlOptions,
    ignored_urls: Arc<[Regex]>,
    parser: Arc<dyn PageParser>,
    clock: Arc<dyn Clock>,
}

impl Coordinator {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `options` - Depth, timeout, ignore patterns and pool size
    /// * `parser` - The capability that fetches and parses pages
    /// * `clock` - Time source for the deadline
    pub fn new(options: CrawlOptions, parser: Arc<dyn PageParser>, clock: Arc<dyn Clock>) -> Self {
        let ignored_urls = options.ignored_urls.clone().into();
        Self {
            options,
            ignored_urls,
            parser,
            clock,
        }
    }

    /// Creates a coordinator from a configuration document
    ///
    /// The configuration is validated first. When it lists ignored words the
    /// parser is wrapped so those words never reach the aggregate.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to crawl
    /// * `Err(ConfigError)` - A pattern or starting URL is invalid
    pub fn from_config<P>(
        config: &CrawlerConfig,
        parser: P,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError>
    where
        P: PageParser + 'static,
    {
        validate(config)?;
        let options = CrawlOptions::from_config(config)?;

        let ignored_words = config.ignored_word_patterns()?;
        let parser: Arc<dyn PageParser> = if ignored_words.is_empty() {
            Arc::new(parser)
        } else {
            Arc::new(WordFilter::new(parser, ignored_words))
        };

        Ok(Self::new(options, parser, clock))
    }

    /// The options this coordinator crawls with
    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// Crawls from each starting URL in turn and returns the aggregate
    ///
    /// All starting URLs share one deadline and one fresh state, so a page
    /// reachable from several of them is still counted once. Must be called
    /// from within a tokio runtime; use a multi-thread runtime to get
    /// parallel fetches.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - Every task finished
    /// * `Err(CrawlError)` - A fetch failed and the crawl was abandoned
    pub async fn crawl<I, S>(&self, starting_urls: I) -> Result<CrawlResult, CrawlError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let started = self.clock.now();
        let deadline = deadline_after(started, self.options.timeout);
        let state = Arc::new(CrawlState::new());

        tracing::info!(
            "Starting crawl (max depth {}, {:?} policy, deadline {})",
            self.options.max_depth,
            self.options.depth_policy,
            deadline
        );

        for url in starting_urls {
            let root = CrawlTask::new(
                url,
                self.options.max_depth,
                deadline,
                self.options.depth_policy,
                Arc::clone(&state),
                Arc::clone(&self.parser),
                Arc::clone(&self.ignored_urls),
                Arc::clone(&self.clock),
            );
            let root_url = root.url().to_string();

            // The root runs as its own pool task so its children can be
            // stolen by any worker.
            let joined = tokio::spawn(root.run()).await;
            if let Err(e) = joined.map_err(CrawlError::from).and_then(|r| r) {
                tracing::error!("Crawl from {} aborted: {}", root_url, e);
                return Err(e);
            }
        }

        let result = state.snapshot();
        tracing::info!(
            "Crawl completed: {} pages visited, {} distinct words in {}",
            result.urls_visited,
            result.word_counts.len(),
            self.clock.now() - started
        );

        Ok(result)
    }

    /// Builds a dedicated work-stealing pool and blocks on [`crawl`](Self::crawl)
    ///
    /// Must not be called from inside an async context.
    pub fn crawl_blocking<I, S>(&self, starting_urls: I) -> Result<CrawlResult, CrawlError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.options.parallelism.max(1))
            .thread_name("wordcrawl-worker")
            .enable_all()
            .build()
            .map_err(CrawlError::Runtime)?;

        runtime.block_on(self.crawl(starting_urls))
    }
}

/// Adds `timeout` to `start`, saturating at the latest representable time
fn deadline_after(start: DateTime<Utc>, timeout: std::time::Duration) -> DateTime<Utc> {
    Duration::from_std(timeout)
        .ok()
        .and_then(|timeout| start.checked_add_signed(timeout))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
