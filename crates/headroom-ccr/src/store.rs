use crate::address::{content_address, searchable_text};
use crate::error::{CcrError, Result};
use crate::types::{CacheEntry, Expansion, PutOutcome, Retrieval, KEYWORD_RELEVANCE, MAX_EXPANSIONS};
use chrono::{DateTime, Duration, Utc};
use headroom_telemetry::{atomic_write, read_json, Metrics};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

const SNAPSHOT_VERSION: u32 = 1;

// chrono::Duration::seconds panics past i64::MAX milliseconds
const MAX_TTL_SECS: u64 = (i64::MAX / 1000) as u64;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    entries: Vec<CacheEntry>,
}

/// In-memory content-addressable store with lazy TTL expiry
///
/// Entries are keyed by [`content_address`] of their payload, so identical
/// payloads always land on one entry. Expired entries are removed by
/// [`CcrStore::sweep`], which every read path runs before looking anything up.
pub struct CcrStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    metrics: Arc<Metrics>,
}

impl CcrStore {
    pub fn new(ttl_secs: u64, metrics: Arc<Metrics>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64),
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.created_at > self.ttl
    }

    /// Store a payload, returning its address
    pub fn put(&self, payload: Value, source_label: &str) -> Result<PutOutcome> {
        self.put_at(payload, source_label, Utc::now())
    }

    /// Store a payload as of `now`. A live entry for the same payload keeps
    /// its original timestamp and is not counted as a new store; an expired
    /// one is replaced as if it had already been swept.
    pub fn put_at(
        &self,
        payload: Value,
        source_label: &str,
        now: DateTime<Utc>,
    ) -> Result<PutOutcome> {
        let address = content_address(&payload)?;

        let inserted = {
            let mut entries = self.entries.write();
            let live = entries
                .get(&address)
                .is_some_and(|existing| !self.is_expired(existing, now));
            if live {
                false
            } else {
                entries.insert(
                    address.clone(),
                    CacheEntry {
                        address: address.clone(),
                        payload,
                        created_at: now,
                        source_label: source_label.to_string(),
                    },
                );
                true
            }
        };

        if inserted {
            self.metrics.record_ccr_store();
            tracing::debug!(%address, source = source_label, "ccr entry stored");
        } else {
            tracing::debug!(%address, "ccr payload already stored");
        }

        Ok(PutOutcome { address, inserted })
    }

    /// Remove every entry older than the TTL
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let any_expired = self
            .entries
            .read()
            .values()
            .any(|e| self.is_expired(e, now));
        if !any_expired {
            return 0;
        }

        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| now - e.created_at <= self.ttl);
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = entries.len(), "ccr sweep");
        }
        removed
    }

    pub fn get(&self, address: &str) -> Result<CacheEntry> {
        self.get_at(address, Utc::now())
    }

    pub fn get_at(&self, address: &str, now: DateTime<Utc>) -> Result<CacheEntry> {
        self.sweep(now);
        let entry = self
            .entries
            .read()
            .get(address)
            .cloned()
            .ok_or_else(|| CcrError::NotFound(address.to_string()))?;
        self.metrics.record_ccr_retrieval();
        Ok(entry)
    }

    /// Fetch a payload, filtered by `query` when one is given
    pub fn search(&self, address: &str, query: Option<&str>, max_results: usize) -> Result<Retrieval> {
        self.search_at(address, query, max_results, Utc::now())
    }

    pub fn search_at(
        &self,
        address: &str,
        query: Option<&str>,
        max_results: usize,
        now: DateTime<Utc>,
    ) -> Result<Retrieval> {
        let entry = self.get_at(address, now)?;
        let query = query.filter(|q| !q.is_empty());

        match (query, entry.payload) {
            (Some(q), Value::Array(items)) => {
                let needle = q.to_lowercase();
                let mut matches = Vec::new();
                for item in items {
                    if matches.len() >= max_results {
                        break;
                    }
                    if searchable_text(&item)?.to_lowercase().contains(&needle) {
                        matches.push(item);
                    }
                }
                Ok(Retrieval {
                    items_retrieved: matches.len(),
                    content: Value::Array(matches),
                    was_search: true,
                })
            }
            (Some(q), Value::String(text)) => {
                if text.to_lowercase().contains(&q.to_lowercase()) {
                    Ok(Retrieval {
                        content: Value::String(text),
                        items_retrieved: 1,
                        was_search: true,
                    })
                } else {
                    Err(CcrError::QueryNotFound)
                }
            }
            (_, payload) => Ok(Retrieval {
                items_retrieved: match &payload {
                    Value::Array(items) => items.len(),
                    _ => 1,
                },
                content: payload,
                was_search: false,
            }),
        }
    }

    /// Entries whose payload mentions `keyword`, oldest first, at most five
    pub fn find_by_keyword(&self, keyword: &str) -> Result<Vec<Expansion>> {
        self.find_by_keyword_at(keyword, Utc::now())
    }

    pub fn find_by_keyword_at(&self, keyword: &str, now: DateTime<Utc>) -> Result<Vec<Expansion>> {
        self.sweep(now);
        let needle = keyword.to_lowercase();

        let entries = self.entries.read();
        let mut hits: Vec<&CacheEntry> = Vec::new();
        for entry in entries.values() {
            if searchable_text(&entry.payload)?.to_lowercase().contains(&needle) {
                hits.push(entry);
            }
        }
        hits.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.address.cmp(&b.address))
        });

        Ok(hits
            .into_iter()
            .take(MAX_EXPANSIONS)
            .map(|e| Expansion {
                address: e.address.clone(),
                source_label: e.source_label.clone(),
                relevance: KEYWORD_RELEVANCE,
            })
            .collect())
    }

    /// Persist all live entries to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut entries: Vec<CacheEntry> = self.entries.read().values().cloned().collect();
        entries.sort_by(|a, b| a.address.cmp(&b.address));
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            entries,
        };
        let json = serde_json::to_vec_pretty(&snapshot)?;
        atomic_write(path, &json)?;
        Ok(())
    }

    /// Restore a store from `path`; a missing file yields an empty store.
    /// Expired entries and entries whose address no longer matches their
    /// payload are dropped.
    pub fn load(path: &Path, ttl_secs: u64, metrics: Arc<Metrics>) -> Result<Self> {
        let store = Self::new(ttl_secs, metrics);
        let Some(snapshot) = read_json::<Snapshot>(path)? else {
            return Ok(store);
        };

        {
            let mut entries = store.entries.write();
            for entry in snapshot.entries {
                if content_address(&entry.payload)? != entry.address {
                    tracing::warn!(address = %entry.address, "dropping ccr entry with mismatched address");
                    continue;
                }
                entries.insert(entry.address.clone(), entry);
            }
        }
        store.sweep(Utc::now());
        Ok(store)
    }
}
