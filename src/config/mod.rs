//! Configuration module for Wordcrawl
//!
//! This module handles loading and validating the JSON crawl configuration.
//! Loading is forgiving: an unreadable or malformed document yields the
//! default configuration. Validation is a separate, fallible step.
//!
//! # Example
//!
//! ```no_run
//! use wordcrawl::config::{load_config, validate};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.json"));
//! validate(&config).unwrap();
//! println!("Crawler will use max depth: {}", config.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{compile_patterns, CrawlerConfig, DepthPolicy};

// Re-export parser functions
pub use parser::{load_config, read_config, try_load_config, try_read_config};
pub use validation::validate;
