use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The AI service that produced a response.
///
/// The set is closed: every applied-keyword computation yields one record per
/// variant, so adding a backend means extending [`BackendType::ALL`] too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    OpenAi,
    Anthropic,
    Gemini,
}

impl BackendType {
    /// Every backend type, in declaration order.
    pub const ALL: [BackendType; 3] = [
        BackendType::OpenAi,
        BackendType::Anthropic,
        BackendType::Gemini,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BackendType::OpenAi => "openai",
            BackendType::Anthropic => "anthropic",
            BackendType::Gemini => "gemini",
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A keyword to locate inside historical responses.
///
/// Bounds are inclusive and independent; when both are set the caller is
/// expected to keep `start_bound <= end_bound`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    pub text: String,
    #[serde(default)]
    pub uses_pattern_match: bool,
    pub start_bound: Option<DateTime<Utc>>,
    pub end_bound: Option<DateTime<Utc>>,
}

impl Keyword {
    /// A case-sensitive substring keyword with no temporal bounds.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            uses_pattern_match: false,
            start_bound: None,
            end_bound: None,
        }
    }

    /// A regular-expression keyword with no temporal bounds.
    #[must_use]
    pub fn pattern(text: impl Into<String>) -> Self {
        Self {
            uses_pattern_match: true,
            ..Self::literal(text)
        }
    }

    #[must_use]
    pub fn with_start_bound(mut self, start: DateTime<Utc>) -> Self {
        self.start_bound = Some(start);
        self
    }

    #[must_use]
    pub fn with_end_bound(mut self, end: DateTime<Utc>) -> Self {
        self.end_bound = Some(end);
        self
    }
}

/// A historical response received from an AI backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub text: String,
    pub backend_type: BackendType,
    pub created_at: DateTime<Utc>,
}

impl Response {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        backend_type: BackendType,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            text: text.into(),
            backend_type,
            created_at,
        }
    }
}

/// Match statistics for one keyword over the responses of one backend type.
///
/// Records carry no identifier; consumers key them by `(backend_type, text)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedKeyword {
    pub backend_type: BackendType,
    pub text: String,
    pub start_bound: Option<DateTime<Utc>>,
    pub end_bound: Option<DateTime<Utc>>,
    /// All responses of `backend_type`, regardless of bounds or matching.
    pub total_responses_count: usize,
    /// Responses of `backend_type` matching the keyword within its bounds.
    pub matching_responses_count: usize,
}
