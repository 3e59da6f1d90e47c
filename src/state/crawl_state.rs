use crate::output::CrawlResult;
use dashmap::{DashMap, DashSet};
use std::collections::HashMap;

/// State shared by every task of one crawl invocation
///
/// All mutation goes through [`claim_if_unvisited`](Self::claim_if_unvisited)
/// and [`merge_word_counts`](Self::merge_word_counts); both are safe under any
/// number of concurrent callers and never hold a crawl-wide lock.
#[derive(Debug, Default)]
pub struct CrawlState {
    /// Occurrences of each word across every visited page
    word_counts: DashMap<String, u64>,

    /// URLs claimed by some task; never shrinks
    visited: DashSet<String>,
}

impl CrawlState {
    /// Creates an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url` for the calling task
    ///
    /// Returns `true` exactly once per distinct URL over the life of the
    /// state. The membership check and the insert happen under one shard
    /// lock, so two tasks racing on one URL cannot both win.
    pub fn claim_if_unvisited(&self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    /// Adds a page's word counts into the aggregate
    pub fn merge_word_counts(&self, counts: &HashMap<String, u64>) {
        for (word, count) in counts {
            *self.word_counts.entry(word.clone()).or_insert(0) += count;
        }
    }

    /// Returns true if `url` has been claimed
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Number of URLs claimed so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Copies the aggregate and visited count out of the shared maps
    ///
    /// Only meaningful once every task writing to this state has been joined.
    pub fn snapshot(&self) -> CrawlResult {
        let word_counts = self
            .word_counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();

        CrawlResult {
            word_counts,
            urls_visited: self.visited.len(),
        }
    }
}
