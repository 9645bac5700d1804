//! URL handling module for Page-Indexer
//!
//! This module resolves hrefs found on a page into absolute URLs and derives
//! the case-insensitive keys the visited set deduplicates on.

mod normalize;
mod resolve;

pub use normalize::visit_key;
pub use resolve::resolve_href;
