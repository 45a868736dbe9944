use promptbank_core::Keyword;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("keyword '{}' is not a valid pattern: {source}", .keyword.text)]
    PatternCompilation {
        keyword: Keyword,
        #[source]
        source: regex::Error,
    },

    #[error("failed to build keyword engine worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
