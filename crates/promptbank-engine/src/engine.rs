use promptbank_core::{AppConfig, AppliedKeyword, BackendType, Keyword, Response};
use rayon::prelude::*;

use crate::aggregate::aggregate;
use crate::error::EngineError;
use crate::partition::Partition;
use crate::predicate::KeywordPredicate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Worker pool size; `0` lets rayon pick one thread per available CPU.
    pub worker_threads: usize,
}

impl EngineConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            worker_threads: config.engine_worker_threads,
        }
    }
}

/// Keyword application engine backed by a dedicated work-stealing pool.
///
/// Holds no state between calls besides the pool itself.
#[derive(Debug)]
pub struct KeywordEngine {
    pool: rayon::ThreadPool,
}

impl KeywordEngine {
    /// Start the engine's worker pool.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::WorkerPool`] if the pool threads cannot be spawned.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|i| format!("keyword-engine-{i}"))
            .build()?;

        tracing::debug!(
            worker_threads = pool.current_num_threads(),
            "keyword engine pool started"
        );
        Ok(Self { pool })
    }

    #[must_use]
    pub fn worker_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Compute applied keywords on this engine's pool.
    ///
    /// See [`compute_applied_keywords`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PatternCompilation`] for the first keyword (in
    /// input order) whose pattern fails to compile.
    pub fn compute_applied_keywords(
        &self,
        keywords: &[Keyword],
        responses: &[Response],
    ) -> Result<Vec<AppliedKeyword>, EngineError> {
        self.pool
            .install(|| compute_applied_keywords(keywords, responses))
    }
}

/// Compute one [`AppliedKeyword`] per (backend type, keyword) pair.
///
/// Every variant of [`BackendType::ALL`] is reported, including backends with
/// no responses, so the output always holds
/// `BackendType::ALL.len() * keywords.len()` records. Callers must not rely
/// on record order.
///
/// Runs on the current rayon pool (the global one unless called from inside
/// [`KeywordEngine::compute_applied_keywords`]).
///
/// # Errors
///
/// Returns [`EngineError::PatternCompilation`] for the first keyword (in input
/// order) whose pattern fails to compile. No records are produced in that case.
pub fn compute_applied_keywords(
    keywords: &[Keyword],
    responses: &[Response],
) -> Result<Vec<AppliedKeyword>, EngineError> {
    // All predicates are built up front so a bad pattern fails the whole
    // batch before any evaluation runs.
    let predicates = keywords
        .iter()
        .map(KeywordPredicate::build)
        .collect::<Result<Vec<_>, _>>()?;

    let partitions: Vec<Partition<'_>> = BackendType::ALL
        .par_iter()
        .map(|backend_type| Partition::of(responses, *backend_type))
        .collect();

    let units: Vec<(&Partition<'_>, &Keyword, &KeywordPredicate)> = partitions
        .iter()
        .flat_map(|partition| {
            keywords
                .iter()
                .zip(&predicates)
                .map(move |(keyword, predicate)| (partition, keyword, predicate))
        })
        .collect();

    let applied: Vec<AppliedKeyword> = units
        .par_iter()
        .map(|&(partition, keyword, predicate)| aggregate(partition, keyword, predicate))
        .collect();

    tracing::debug!(
        keywords = keywords.len(),
        responses = responses.len(),
        records = applied.len(),
        "computed applied keywords"
    );

    Ok(applied)
}
