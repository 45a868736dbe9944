//! Shared domain types and configuration for promptbank.
//!
//! Holds the keyword/response data model consumed by the keyword engine,
//! env-driven application configuration, and the keyword definition file
//! loader used by the CLI.

pub mod app_config;
pub mod config;
pub mod keywords;
mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use keywords::{load_keywords, parse_keywords, KeywordsFile};
pub use types::{AppliedKeyword, BackendType, Keyword, Response};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read keywords file {path}: {source}")]
    KeywordsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse keywords file: {0}")]
    KeywordsFileParse(#[from] serde_yaml::Error),

    #[error("keywords validation failed: {0}")]
    Validation(String),
}
