//! Page parsing capability
//!
//! The crawl core never talks to the network itself. It asks a [`PageParser`]
//! for each claimed URL and gets back:
//! - the number of times each word appears on the page
//! - the outbound links to follow (already absolute and canonical)

use crate::FetchError;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

/// Extracted information from a fetched page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Occurrences of each word on the page
    pub word_counts: HashMap<String, u64>,

    /// Links found on the page
    pub links: Vec<String>,
}

/// Fetches a page and reduces it to word counts and links
///
/// Called exactly once for every URL a crawl claims. Any error aborts the
/// whole crawl.
#[async_trait]
pub trait PageParser: Send + Sync {
    async fn parse(&self, url: &str) -> Result<ParsedPage, FetchError>;
}

#[async_trait]
impl<P: PageParser + ?Sized> PageParser for Arc<P> {
    async fn parse(&self, url: &str) -> Result<ParsedPage, FetchError> {
        (**self).parse(url).await
    }
}

/// Drops ignored words from another parser's results
///
/// A word is dropped when it fully matches any of the patterns, so ignored
/// words never reach the shared aggregate.
pub struct WordFilter<P> {
    inner: P,
    ignored_words: Vec<Regex>,
}

impl<P> WordFilter<P> {
    /// Wraps `inner`, ignoring words matching any of `ignored_words`
    ///
    /// Patterns are expected to be anchored already, as produced by
    /// [`CrawlerConfig::ignored_word_patterns`](crate::config::CrawlerConfig::ignored_word_patterns).
    pub fn new(inner: P, ignored_words: Vec<Regex>) -> Self {
        Self {
            inner,
            ignored_words,
        }
    }

    fn is_ignored(&self, word: &str) -> bool {
        self.ignored_words.iter().any(|p| p.is_match(word))
    }
}

#[async_trait]
impl<P: PageParser> PageParser for WordFilter<P> {
    async fn parse(&self, url: &str) -> Result<ParsedPage, FetchError> {
        let mut page = self.inner.parse(url).await?;
        if !self.ignored_words.is_empty() {
            page.word_counts.retain(|word, _| !self.is_ignored(word));
        }
        Ok(page)
    }
}
