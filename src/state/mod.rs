//! State module for tracking crawl progress
//!
//! This module provides the state shared by all tasks of one crawl.
//!
//! # Components
//!
//! - `CrawlState`: the word-count aggregate and the visited-URL set

mod crawl_state;

// Re-export main types
pub use crawl_state::CrawlState;
