//! Keyword application engine for promptbank.
//!
//! Given keyword definitions and historical AI responses, computes one
//! [`AppliedKeyword`](promptbank_core::AppliedKeyword) per
//! (backend type, keyword) pair: how many responses each backend produced,
//! and how many of them match the keyword within its temporal bounds.
//!
//! Work is split into three steps: partition responses by backend type,
//! build a match predicate per keyword, and aggregate every
//! (partition, predicate) pair on a rayon worker pool.

pub mod cache;
pub mod error;

mod aggregate;
mod engine;
mod partition;
mod predicate;

pub use aggregate::aggregate;
pub use cache::{AppliedKeywordCache, CacheLookup, InputFingerprint};
pub use engine::{compute_applied_keywords, EngineConfig, KeywordEngine};
pub use error::EngineError;
pub use partition::Partition;
pub use predicate::KeywordPredicate;
