//! Integration tests for the crawler
//!
//! These tests drive full crawls over an in-memory page graph and check the
//! visited set, the word aggregate, and the depth, deadline, and ignore cutoffs.

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use wordcrawl::clock::{Clock, FakeClock, SystemClock};
use wordcrawl::config::{load_config, CrawlerConfig, DepthPolicy};
use wordcrawl::crawler::{run_crawl, Coordinator, CrawlOptions, PageParser, ParsedPage};
use wordcrawl::profiler::{Profiler, TimedOperations};
use wordcrawl::{CrawlError, FetchError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A page in the test graph
#[derive(Clone, Default)]
struct Page {
    words: HashMap<String, u64>,
    links: Vec<String>,
}

/// Serves pages from memory and counts how often each URL is fetched
#[derive(Default)]
struct GraphParser {
    pages: HashMap<String, Page>,
    fetches: Mutex<HashMap<String, usize>>,
    in_flight_hook: Option<Box<dyn Fn(&str) + Send + Sync>>,
    delay_ms: u64,
}

impl GraphParser {
    fn page(mut self, url: &str, words: &[(&str, u64)], links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            Page {
                words: words.iter().map(|(w, c)| (w.to_string(), *c)).collect(),
                links: links.iter().map(|l| l.to_string()).collect(),
            },
        );
        self
    }

    fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    fn on_fetch(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.in_flight_hook = Some(Box::new(hook));
        self
    }

    fn fetched(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.fetches.lock().unwrap().keys().cloned().collect();
        urls.sort();
        urls
    }

    fn fetch_count(&self, url: &str) -> usize {
        self.fetches.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    /// Sum of the word counts of every fetched page
    fn expected_counts(&self) -> HashMap<String, u64> {
        let mut expected = HashMap::new();
        for url in self.fetched() {
            for (word, count) in &self.pages[&url].words {
                *expected.entry(word.clone()).or_insert(0) += count;
            }
        }
        expected
    }
}

impl TimedOperations for GraphParser {
    const TIMED_OPERATIONS: &'static [&'static str] = &["parse"];
}

#[async_trait]
impl PageParser for GraphParser {
    async fn parse(&self, url: &str) -> Result<ParsedPage, FetchError> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;

        if let Some(hook) = &self.in_flight_hook {
            hook(url);
        }
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }

        let page = self.pages.get(url).ok_or_else(|| FetchError::Request {
            url: url.to_string(),
            message: "HTTP 404".to_string(),
        })?;

        Ok(ParsedPage {
            word_counts: page.words.clone(),
            links: page.links.clone(),
        })
    }
}

fn options(max_depth: u32, ignored: &[&str], policy: DepthPolicy) -> CrawlOptions {
    let config = CrawlerConfig {
        max_depth,
        timeout_seconds: 60,
        ignored_urls: ignored.iter().map(|s| s.to_string()).collect(),
        parallelism: 4,
        depth_policy: policy,
        ..CrawlerConfig::default()
    };
    CrawlOptions::from_config(&config).expect("valid test options")
}

fn coordinator(options: CrawlOptions, parser: Arc<GraphParser>) -> Coordinator {
    Coordinator::new(options, parser, Arc::new(SystemClock))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cycle_visited_once_and_depth_excludes_far_page() {
    init_tracing();
    let parser = Arc::new(
        GraphParser::default()
            .page("a", &[("alpha", 1), ("shared", 1)], &["b", "c"])
            .page("b", &[("beta", 2), ("shared", 1)], &["a", "d"])
            .page("c", &[("gamma", 3)], &[])
            .page("d", &[("delta", 4)], &[]),
    );

    let result = coordinator(options(2, &[], DepthPolicy::Decrement), parser.clone())
        .crawl(["a"])
        .await
        .expect("crawl succeeds");

    assert_eq!(parser.fetched(), vec!["a", "b", "c"]);
    assert_eq!(parser.fetch_count("a"), 1);
    assert_eq!(result.urls_visited, 3);
    assert_eq!(result.word_counts["shared"], 2);
    assert_eq!(result.word_counts["alpha"], 1);
    assert!(!result.word_counts.contains_key("delta"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_diamond_fan_in_fetches_each_url_once() {
    init_tracing();
    let middle: Vec<String> = (0..40).map(|i| format!("m{}", i)).collect();
    let middle_refs: Vec<&str> = middle.iter().map(String::as_str).collect();

    let mut graph = GraphParser::default()
        .with_delay(2)
        .page("root", &[("start", 1)], &middle_refs)
        .page("sink", &[("sink", 1)], &["root"]);
    for m in &middle {
        graph = graph.page(m, &[("middle", 1)], &["sink", "root"]);
    }
    let parser = Arc::new(graph);

    let result = coordinator(options(5, &[], DepthPolicy::Decrement), parser.clone())
        .crawl(["root"])
        .await
        .expect("crawl succeeds");

    assert_eq!(parser.fetch_count("sink"), 1);
    assert_eq!(parser.fetch_count("root"), 1);
    assert_eq!(result.urls_visited, 42);
    assert_eq!(result.word_counts["middle"], 40);
    assert_eq!(result.word_counts["sink"], 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_aggregate_equals_sum_over_visited_pages() {
    let mut graph = GraphParser::default();
    for i in 0..30u64 {
        let links = [format!("p{}", (i * 7 + 3) % 30), format!("p{}", (i * 11 + 5) % 30)];
        let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
        graph = graph.page(
            &format!("p{}", i),
            &[("common", 1), (if i % 2 == 0 { "even" } else { "odd" }, i + 1)],
            &link_refs,
        );
    }
    let parser = Arc::new(graph);

    let result = coordinator(options(4, &[], DepthPolicy::Decrement), parser.clone())
        .crawl(["p0"])
        .await
        .expect("crawl succeeds");

    assert_eq!(result.urls_visited, parser.fetched().len());
    assert_eq!(result.word_counts, parser.expected_counts());
    for url in parser.fetched() {
        assert_eq!(parser.fetch_count(&url), 1, "{} fetched more than once", url);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_no_page_beyond_depth_is_fetched() {
    let mut graph = GraphParser::default();
    for i in 0..10 {
        let next = format!("n{}", i + 1);
        graph = graph.page(&format!("n{}", i), &[("hop", 1)], &[next.as_str()]);
    }
    let parser = Arc::new(graph);

    let result = coordinator(options(4, &[], DepthPolicy::Decrement), parser.clone())
        .crawl(["n0"])
        .await
        .expect("crawl succeeds");

    assert_eq!(parser.fetched(), vec!["n0", "n1", "n2", "n3"]);
    assert_eq!(result.word_counts["hop"], 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_constant_depth_policy_follows_until_exhausted() {
    let mut graph = GraphParser::default();
    for i in 0..10 {
        let next = format!("n{}", i + 1);
        graph = graph.page(&format!("n{}", i), &[("hop", 1)], &[next.as_str()]);
    }
    graph = graph.page("n10", &[("hop", 1)], &["n0"]);
    let parser = Arc::new(graph);

    let result = coordinator(options(1, &[], DepthPolicy::Constant), parser.clone())
        .crawl(["n0"])
        .await
        .expect("crawl succeeds");

    assert_eq!(result.urls_visited, 11);
    assert_eq!(result.word_counts["hop"], 11);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ignored_url_never_fetched() {
    let parser = Arc::new(
        GraphParser::default()
            .page("http://site/", &[("home", 1)], &["http://site/admin/login", "http://site/blog"])
            .page("http://site/blog", &[("post", 1)], &["http://site/admin/panel"])
            .page("http://site/admin/login", &[("secret", 1)], &[])
            .page("http://site/admin/panel", &[("secret", 1)], &[]),
    );

    for policy in [DepthPolicy::Decrement, DepthPolicy::Constant] {
        let result = coordinator(options(100, &["http://site/admin/.*"], policy), parser.clone())
            .crawl(["http://site/"])
            .await
            .expect("crawl succeeds");

        assert_eq!(result.urls_visited, 2);
        assert!(!result.word_counts.contains_key("secret"));
    }
    assert_eq!(parser.fetch_count("http://site/admin/login"), 0);
    assert_eq!(parser.fetch_count("http://site/admin/panel"), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_in_flight_fetch_merges_after_deadline() {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    let clock = Arc::new(FakeClock::new(start));
    let hook_clock = Arc::clone(&clock);

    // Fetching the root takes the clock past the 60s timeout.
    let parser = Arc::new(
        GraphParser::default()
            .page("root", &[("early", 3)], &["child-1", "child-2"])
            .page("child-1", &[("late", 1)], &[])
            .page("child-2", &[("late", 1)], &[])
            .on_fetch(move |url| {
                if url == "root" {
                    hook_clock.advance(Duration::seconds(61));
                }
            }),
    );

    let coordinator = Coordinator::new(
        options(10, &[], DepthPolicy::Decrement),
        parser.clone(),
        clock.clone() as Arc<dyn Clock>,
    );
    let result = coordinator.crawl(["root"]).await.expect("crawl succeeds");

    assert_eq!(parser.fetched(), vec!["root"]);
    assert_eq!(result.urls_visited, 1);
    assert_eq!(result.word_counts["early"], 3);
    assert!(!result.word_counts.contains_key("late"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fetch_failure_aborts_crawl() {
    let parser = Arc::new(
        GraphParser::default()
            .page("a", &[("word", 1)], &["b", "broken"])
            .page("b", &[("word", 1)], &[]),
    );

    let err = coordinator(options(3, &[], DepthPolicy::Decrement), parser)
        .crawl(["a"])
        .await
        .expect_err("missing page must abort the crawl");

    assert!(matches!(
        err,
        CrawlError::Fetch(FetchError::Request { ref url, .. }) if url == "broken"
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_starting_urls_share_state() {
    let parser = Arc::new(
        GraphParser::default()
            .page("x", &[("x", 1)], &["shared"])
            .page("y", &[("y", 1)], &["shared"])
            .page("shared", &[("common", 5)], &[]),
    );

    let result = coordinator(options(2, &[], DepthPolicy::Decrement), parser.clone())
        .crawl(["x", "y"])
        .await
        .expect("crawl succeeds");

    assert_eq!(result.urls_visited, 3);
    assert_eq!(result.word_counts["common"], 5);
    assert_eq!(parser.fetch_count("shared"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_profiled_parser_records_parse_time() {
    let parser = GraphParser::default()
        .page("a", &[("word", 1)], &["b"])
        .page("b", &[("word", 1)], &[]);

    let profiler = Profiler::new(Arc::new(SystemClock));
    let timed = profiler.wrap(parser).expect("GraphParser declares parse");

    let result = Coordinator::new(
        options(2, &[], DepthPolicy::Decrement),
        Arc::new(timed),
        Arc::new(SystemClock),
    )
    .crawl(["a"])
    .await
    .expect("crawl succeeds");
    assert_eq!(result.word_counts["word"], 2);

    let mut report = Vec::new();
    profiler.write_report(&mut report).unwrap();
    let report = String::from_utf8(report).unwrap();
    let lines: Vec<&str> = report.lines().collect();

    assert!(lines[0].starts_with("Run at "));
    assert!(lines[1].contains("GraphParser#parse took "));
    assert_eq!(lines.len(), 3);
    assert!(report.ends_with("\n\n"));
}

#[test]
fn test_run_crawl_from_config_file() {
    init_tracing();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
  "startingUrls": ["http://site/"],
  "maxDepth": 3,
  "timeoutSeconds": 30,
  "ignoredUrls": ["http://site/skip.*"],
  "ignoredWords": ["the|a|of"],
  "parallelism": 2,
  "popularWordCount": 2,
  "someFutureOption": true
}}"#
    )
    .unwrap();
    file.flush().unwrap();

    let config = load_config(file.path());
    assert_eq!(config.max_depth, 3);

    let parser = GraphParser::default()
        .page(
            "http://site/",
            &[("the", 9), ("crawler", 4), ("rust", 2)],
            &["http://site/docs", "http://site/skip-me"],
        )
        .page("http://site/docs", &[("a", 5), ("rust", 3), ("of", 2)], &[])
        .page("http://site/skip-me", &[("hidden", 100)], &[]);

    let result = run_crawl(&config, parser).expect("crawl succeeds");

    assert_eq!(result.urls_visited, 2);
    assert!(!result.word_counts.contains_key("the"));
    assert!(!result.word_counts.contains_key("hidden"));
    assert_eq!(
        result.popular_words(config.popular_word_count),
        vec![("rust".to_string(), 5), ("crawler".to_string(), 4)]
    );
}

#[test]
fn test_unreadable_config_is_default_and_crawls_nothing() {
    let config = load_config(Path::new("/nonexistent/crawl.json"));
    assert_eq!(config, CrawlerConfig::default());

    let result = run_crawl(&config, GraphParser::default()).expect("empty crawl succeeds");
    assert_eq!(result.urls_visited, 0);
    assert!(result.word_counts.is_empty());
}
