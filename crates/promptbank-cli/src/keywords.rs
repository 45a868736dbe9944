//! Keyword command handlers for the CLI.
//!
//! Keyword definitions come from a YAML file and responses from a JSON
//! export; neither is fetched from storage here.

use std::path::Path;

use anyhow::Context;
use promptbank_core::{AppliedKeyword, BackendType, Keyword, Response};
use promptbank_engine::{EngineConfig, EngineError, KeywordEngine, KeywordPredicate};

/// Counts reported by `check`.
#[derive(Debug, Default, PartialEq, Eq)]
struct CheckSummary {
    patterns: usize,
    literals: usize,
    inverted_bounds: usize,
}

/// Apply the keywords in `keywords_path` to the responses in
/// `responses_path` and print the applied keywords as a JSON array.
///
/// # Errors
///
/// Returns an error if either file cannot be loaded, the engine pool cannot
/// start, or any pattern keyword fails to compile.
pub(crate) fn run_apply(
    keywords_path: &Path,
    responses_path: &Path,
    worker_threads: usize,
    pretty: bool,
) -> anyhow::Result<()> {
    let applied = apply_files(keywords_path, responses_path, worker_threads)?;
    println!("{}", render_applied(&applied, pretty)?);
    Ok(())
}

/// Validate a keyword file and report how many keywords of each kind it holds.
///
/// Keywords whose start bound is after their end bound are accepted but
/// logged, since they can never match.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or any pattern fails to compile.
pub(crate) fn run_check(keywords_path: &Path) -> anyhow::Result<()> {
    let keywords_file = promptbank_core::load_keywords(keywords_path)?;
    let summary = check_keywords(&keywords_file.keywords)?;

    println!(
        "{} keywords OK ({} pattern, {} literal) in {}",
        keywords_file.keywords.len(),
        summary.patterns,
        summary.literals,
        keywords_path.display()
    );
    if summary.inverted_bounds > 0 {
        println!(
            "warning: {} keyword(s) have a start bound after their end bound and will never match",
            summary.inverted_bounds
        );
    }
    Ok(())
}

pub(crate) fn run_backends() {
    for backend in BackendType::ALL {
        println!("{backend}");
    }
}

fn apply_files(
    keywords_path: &Path,
    responses_path: &Path,
    worker_threads: usize,
) -> anyhow::Result<Vec<AppliedKeyword>> {
    let keywords = promptbank_core::load_keywords(keywords_path)?.keywords;
    let responses = load_responses(responses_path)?;

    let engine = KeywordEngine::new(EngineConfig { worker_threads })?;
    tracing::info!(
        keywords = keywords.len(),
        responses = responses.len(),
        engine_threads = engine.worker_threads(),
        "applying keywords"
    );

    Ok(engine.compute_applied_keywords(&keywords, &responses)?)
}

fn load_responses(path: &Path) -> anyhow::Result<Vec<Response>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read responses file {}", path.display()))?;
    parse_responses(&content)
        .with_context(|| format!("invalid responses file {}", path.display()))
}

fn parse_responses(content: &str) -> anyhow::Result<Vec<Response>> {
    serde_json::from_str(content).context("failed to parse responses")
}

fn check_keywords(keywords: &[Keyword]) -> Result<CheckSummary, EngineError> {
    let mut summary = CheckSummary::default();

    for keyword in keywords {
        KeywordPredicate::build(keyword)?;

        if keyword.uses_pattern_match {
            summary.patterns += 1;
        } else {
            summary.literals += 1;
        }

        if let (Some(start), Some(end)) = (keyword.start_bound, keyword.end_bound) {
            if start > end {
                tracing::warn!(
                    text = %keyword.text,
                    %start,
                    %end,
                    "keyword start bound is after its end bound"
                );
                summary.inverted_bounds += 1;
            }
        }
    }

    Ok(summary)
}

fn render_applied(applied: &[AppliedKeyword], pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(applied)
    } else {
        serde_json::to_string(applied)
    }
}
