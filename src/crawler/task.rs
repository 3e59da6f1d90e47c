//! Recursive crawl task
//!
//! A task processes one URL and then forks one child task per outbound link.
//! It is not finished until every task in its subtree is finished.

use crate::clock::Clock;
use crate::config::DepthPolicy;
use crate::crawler::parser::PageParser;
use crate::state::CrawlState;
use crate::CrawlError;
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use regex::Regex;
use std::sync::Arc;
use tokio::task::JoinSet;

/// One unit of crawl work: a URL plus everything needed to process it
///
/// The state, parser, ignore list, and clock are shared by every task of the
/// crawl; only the URL and the remaining depth differ between tasks.
#[derive(Clone)]
pub struct CrawlTask {
    url: String,
    depth: u32,
    deadline: DateTime<Utc>,
    depth_policy: DepthPolicy,
    state: Arc<CrawlState>,
    parser: Arc<dyn PageParser>,
    ignored_urls: Arc<[Regex]>,
    clock: Arc<dyn Clock>,
}

impl CrawlTask {
    /// Creates a root task for `url`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        url: impl Into<String>,
        depth: u32,
        deadline: DateTime<Utc>,
        depth_policy: DepthPolicy,
        state: Arc<CrawlState>,
        parser: Arc<dyn PageParser>,
        ignored_urls: Arc<[Regex]>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            url: url.into(),
            depth,
            deadline,
            depth_policy,
            state,
            parser,
            ignored_urls,
            clock,
        }
    }

    /// The URL this task processes
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Remaining depth budget
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Builds the task for a link found on this task's page
    pub fn child(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: self.depth_policy.child_depth(self.depth),
            ..self.clone()
        }
    }

    /// Runs this task and its whole subtree
    ///
    /// Children are spawned onto the current tokio runtime and joined before
    /// this future resolves. The first fetch failure anywhere in the subtree
    /// is returned; dropping the join set aborts the siblings still running.
    pub fn run(self) -> BoxFuture<'static, Result<(), CrawlError>> {
        async move {
            if self.depth == 0 {
                tracing::trace!("Depth budget exhausted at {}", self.url);
                return Ok(());
            }

            if self.clock.now() > self.deadline {
                tracing::debug!("Deadline passed, not fetching {}", self.url);
                return Ok(());
            }

            if self.is_ignored() {
                tracing::debug!("Ignoring {}", self.url);
                return Ok(());
            }

            if !self.state.claim_if_unvisited(&self.url) {
                tracing::trace!("Already visited {}", self.url);
                return Ok(());
            }

            tracing::debug!("Fetching {} (depth budget {})", self.url, self.depth);
            let page = self.parser.parse(&self.url).await?;

            self.state.merge_word_counts(&page.word_counts);

            let mut children = JoinSet::new();
            for link in page.links {
                children.spawn(self.child(link).run());
            }

            while let Some(joined) = children.join_next().await {
                joined??;
            }

            Ok(())
        }
        .boxed()
    }

    fn is_ignored(&self) -> bool {
        self.ignored_urls.iter().any(|p| p.is_match(&self.url))
    }
}

impl std::fmt::Debug for CrawlTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlTask")
            .field("url", &self.url)
            .field("depth", &self.depth)
            .field("deadline", &self.deadline)
            .field("depth_policy", &self.depth_policy)
            .finish_non_exhaustive()
    }
}
