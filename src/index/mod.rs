//! Index module for handing completed pages to a search backend
//!
//! This module handles:
//! - Accumulating pages into a batch with a flush threshold
//! - Bulk upserts keyed by page URL
//! - The Elasticsearch / OpenSearch HTTP backend

mod batch;
mod elastic;
mod traits;

pub use batch::BulkIndexer;
pub use elastic::{encode_bulk_body, ElasticStore};
pub use traits::{BulkStore, FlushOutcome, IndexSink};
