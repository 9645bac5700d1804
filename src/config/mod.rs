//! Configuration module for Page-Indexer
//!
//! This module handles loading, parsing, and validating YAML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use page_indexer::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.yaml")).unwrap();
//! println!("Crawler will use max depth: {}", config.maximum_search_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, ElasticConfig, LogLevel, RetryPolicy};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
