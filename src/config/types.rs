use crate::ConfigError;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

/// Crawl configuration document
///
/// Every field is optional in the JSON document; missing fields take the
/// values from [`CrawlerConfig::default`] and unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlerConfig {
    /// URLs the crawl starts from, crawled in order with shared state
    pub starting_urls: Vec<String>,

    /// Maximum number of link hops from a starting URL
    pub max_depth: u32,

    /// Seconds after the crawl starts past which no new page is fetched
    pub timeout_seconds: u64,

    /// Regexes matched against whole URLs; matching URLs are skipped
    pub ignored_urls: Vec<String>,

    /// Regexes matched against whole words; matching words are not counted
    pub ignored_words: Vec<String>,

    /// Worker pool size; zero or negative means one worker per core
    pub parallelism: i64,

    /// Number of words kept by the popular-words ranking (0 keeps all)
    pub popular_word_count: usize,

    /// File the profiler report is appended to
    pub profile_output_path: String,

    /// File the crawl result is written to by the embedding application
    pub result_output_path: String,

    /// How the depth budget changes on each hop
    pub depth_policy: DepthPolicy,
}

/// How a child task's depth budget relates to its parent's
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthPolicy {
    /// Each hop consumes one unit of the depth budget
    #[default]
    Decrement,

    /// Children inherit the parent's budget unchanged; only the deadline and
    /// the visited set end the crawl
    Constant,
}

impl DepthPolicy {
    /// Returns the depth budget handed to a child of a task with `depth`
    pub fn child_depth(self, depth: u32) -> u32 {
        match self {
            Self::Decrement => depth.saturating_sub(1),
            Self::Constant => depth,
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            starting_urls: Vec::new(),
            max_depth: 0,
            timeout_seconds: 1,
            ignored_urls: Vec::new(),
            ignored_words: Vec::new(),
            parallelism: -1,
            popular_word_count: 0,
            profile_output_path: String::new(),
            result_output_path: String::new(),
            depth_policy: DepthPolicy::Decrement,
        }
    }
}

impl CrawlerConfig {
    /// Crawl timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Number of pool workers to start
    pub fn effective_parallelism(&self) -> usize {
        match usize::try_from(self.parallelism) {
            Ok(n) if n > 0 => n,
            _ => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }

    /// Compiles `ignored_urls` into full-match regexes
    pub fn ignored_url_patterns(&self) -> Result<Vec<Regex>, ConfigError> {
        compile_patterns(&self.ignored_urls)
    }

    /// Compiles `ignored_words` into full-match regexes
    pub fn ignored_word_patterns(&self) -> Result<Vec<Regex>, ConfigError> {
        compile_patterns(&self.ignored_words)
    }
}

/// Compiles each pattern anchored at both ends so `is_match` means a full match
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
                ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                }
            })
        })
        .collect()
}
