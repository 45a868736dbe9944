//! Caller-owned cache of applied-keyword results.
//!
//! The engine itself is stateless; a caller that re-runs the same inputs
//! (a dashboard refreshing, say) keeps one of these and asks it instead.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use promptbank_core::{AppliedKeyword, Keyword, Response};
use sha2::{Digest, Sha256};

use crate::engine::KeywordEngine;
use crate::error::EngineError;

/// SHA-256 digest over the full content of an engine input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputFingerprint([u8; 32]);

impl InputFingerprint {
    #[must_use]
    pub fn of(keywords: &[Keyword], responses: &[Response]) -> Self {
        let mut hasher = Sha256::new();

        hasher.update((keywords.len() as u64).to_le_bytes());
        for keyword in keywords {
            write_str(&mut hasher, &keyword.text);
            hasher.update([u8::from(keyword.uses_pattern_match)]);
            write_bound(&mut hasher, keyword.start_bound);
            write_bound(&mut hasher, keyword.end_bound);
        }

        hasher.update((responses.len() as u64).to_le_bytes());
        for response in responses {
            write_str(&mut hasher, &response.text);
            write_str(&mut hasher, response.backend_type.as_str());
            write_timestamp(&mut hasher, response.created_at);
        }

        Self(hasher.finalize().into())
    }
}

impl std::fmt::Display for InputFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

// Length prefixes keep adjacent fields from running together.
fn write_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

fn write_bound(hasher: &mut Sha256, bound: Option<DateTime<Utc>>) {
    match bound {
        None => hasher.update([0u8]),
        Some(at) => {
            hasher.update([1u8]);
            write_timestamp(hasher, at);
        }
    }
}

fn write_timestamp(hasher: &mut Sha256, at: DateTime<Utc>) {
    hasher.update(at.timestamp().to_le_bytes());
    hasher.update(at.timestamp_subsec_nanos().to_le_bytes());
}

/// Result of [`AppliedKeywordCache::get_or_compute`].
#[derive(Debug, Clone)]
pub struct CacheLookup {
    pub applied: Arc<[AppliedKeyword]>,
    /// `true` when served from the cache without running the engine.
    pub cached: bool,
}

/// Bounded map from input fingerprint to computed result.
///
/// Evicts in insertion order once more than `max_entries` results are held.
#[derive(Debug)]
pub struct AppliedKeywordCache {
    max_entries: usize,
    entries: HashMap<InputFingerprint, Arc<[AppliedKeyword]>>,
    order: VecDeque<InputFingerprint>,
}

impl AppliedKeywordCache {
    /// Create an empty cache. A `max_entries` of zero is treated as one.
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Return the stored result for these inputs, or compute and store it.
    ///
    /// `force_refresh` skips the lookup and replaces any stored result.
    ///
    /// Holds `&mut self` for the whole engine run. Callers that share the
    /// cache behind a lock should pair [`Self::get`] and [`Self::insert`]
    /// around their own call to the engine instead.
    ///
    /// # Errors
    ///
    /// Propagates [`EngineError`] from the engine; failed computations are
    /// never stored.
    pub fn get_or_compute(
        &mut self,
        engine: &KeywordEngine,
        keywords: &[Keyword],
        responses: &[Response],
        force_refresh: bool,
    ) -> Result<CacheLookup, EngineError> {
        let fingerprint = InputFingerprint::of(keywords, responses);

        if !force_refresh {
            if let Some(applied) = self.get(&fingerprint) {
                return Ok(CacheLookup {
                    applied,
                    cached: true,
                });
            }
        }

        tracing::debug!(%fingerprint, force_refresh, "applied keywords cache miss");
        let applied: Arc<[AppliedKeyword]> =
            engine.compute_applied_keywords(keywords, responses)?.into();
        self.insert(fingerprint, Arc::clone(&applied));

        Ok(CacheLookup {
            applied,
            cached: false,
        })
    }

    /// Look up a stored result without computing anything.
    #[must_use]
    pub fn get(&self, fingerprint: &InputFingerprint) -> Option<Arc<[AppliedKeyword]>> {
        let applied = self.entries.get(fingerprint)?;
        tracing::debug!(%fingerprint, "applied keywords cache hit");
        Some(Arc::clone(applied))
    }

    /// Store a computed result, replacing any entry for the same fingerprint.
    ///
    /// Replacing keeps the entry's original eviction position.
    pub fn insert(&mut self, fingerprint: InputFingerprint, applied: Arc<[AppliedKeyword]>) {
        if self.entries.insert(fingerprint, applied).is_none() {
            self.order.push_back(fingerprint);
        }
        while self.entries.len() > self.max_entries {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }

    /// Drop every stored result.
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
