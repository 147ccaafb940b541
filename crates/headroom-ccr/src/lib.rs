//! Content-addressable retrieval (CCR) cache for offloaded conversation content

mod address;
mod error;
mod store;
mod types;

pub use address::{canonical_json, content_address, searchable_text, ADDRESS_LEN};
pub use error::{CcrError, Result};
pub use store::CcrStore;
pub use types::{
    CacheEntry, Expansion, PutOutcome, Retrieval, KEYWORD_RELEVANCE, MAX_EXPANSIONS,
    UNKNOWN_SOURCE,
};
