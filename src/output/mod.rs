//! Output module for crawl results
//!
//! Writing results to disk is left to the embedding application; this module
//! only defines the result value and how its words are ranked.

pub mod stats;

pub use stats::CrawlResult;
