//! Final crawl result and word ranking
//!
//! This module holds what a finished crawl hands back to its caller and the
//! popular-words ranking applied when presenting it.

use std::cmp::Ordering;
use std::collections::HashMap;

/// Aggregate produced by one crawl invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlResult {
    /// Occurrences of each word, summed over every visited page
    pub word_counts: HashMap<String, u64>,

    /// Number of distinct URLs that were fetched
    pub urls_visited: usize,
}

impl CrawlResult {
    /// Returns the `limit` most popular words, or all of them when `limit` is 0
    ///
    /// Words are ordered by count (descending), then by length (descending),
    /// then alphabetically.
    pub fn popular_words(&self, limit: usize) -> Vec<(String, u64)> {
        let mut words: Vec<(String, u64)> = self
            .word_counts
            .iter()
            .map(|(word, count)| (word.clone(), *count))
            .collect();
        words.sort_by(|a, b| compare_popularity(a, b));

        if limit > 0 {
            words.truncate(limit);
        }
        words
    }

    /// Total word occurrences across all visited pages
    pub fn total_words(&self) -> u64 {
        self.word_counts.values().sum()
    }
}

fn compare_popularity(a: &(String, u64), b: &(String, u64)) -> Ordering {
    b.1.cmp(&a.1)
        .then_with(|| b.0.len().cmp(&a.0.len()))
        .then_with(|| a.0.cmp(&b.0))
}
