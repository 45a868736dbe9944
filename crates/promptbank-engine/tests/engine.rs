//! End-to-end behaviour of the keyword application engine.

use chrono::{DateTime, Duration, Utc};
use promptbank_core::{AppliedKeyword, BackendType, Keyword, Response};
use promptbank_engine::{compute_applied_keywords, EngineConfig, EngineError, KeywordEngine};

fn engine() -> KeywordEngine {
    KeywordEngine::new(EngineConfig { worker_threads: 4 }).expect("engine pool")
}

fn find<'a>(applied: &'a [AppliedKeyword], backend: BackendType, text: &str) -> &'a AppliedKeyword {
    applied
        .iter()
        .find(|a| a.backend_type == backend && a.text == text)
        .unwrap_or_else(|| panic!("no record for ({backend}, {text})"))
}

fn sample_responses(now: DateTime<Utc>) -> Vec<Response> {
    vec![
        Response::new("test response", BackendType::OpenAi, now),
        Response::new("another response", BackendType::OpenAi, now),
        Response::new("test reply", BackendType::Anthropic, now),
        Response::new("Refund issued in 3 days", BackendType::Gemini, now - Duration::days(4)),
        Response::new("no refund, sorry", BackendType::Gemini, now - Duration::days(1)),
        Response::new("refunds take 10 days", BackendType::Anthropic, now - Duration::days(2)),
    ]
}

fn sample_keywords(now: DateTime<Utc>) -> Vec<Keyword> {
    vec![
        Keyword::literal("test"),
        Keyword::literal("refund").with_start_bound(now - Duration::days(3)),
        Keyword::pattern(r"\d+ days").with_end_bound(now - Duration::days(1)),
        Keyword::pattern("(?i)refund")
            .with_start_bound(now - Duration::days(5))
            .with_end_bound(now - Duration::days(2)),
        Keyword::literal(""),
    ]
}

#[test]
fn literal_keyword_across_backends() {
    let now = Utc::now();
    let responses = vec![
        Response::new("test response", BackendType::OpenAi, now),
        Response::new("another response", BackendType::OpenAi, now),
        Response::new("test reply", BackendType::Anthropic, now),
    ];
    let keywords = vec![Keyword::literal("test")];

    let applied = engine()
        .compute_applied_keywords(&keywords, &responses)
        .unwrap();

    assert_eq!(applied.len(), BackendType::ALL.len());

    let openai = find(&applied, BackendType::OpenAi, "test");
    assert_eq!(openai.total_responses_count, 2);
    assert_eq!(openai.matching_responses_count, 1);

    let anthropic = find(&applied, BackendType::Anthropic, "test");
    assert_eq!(anthropic.total_responses_count, 1);
    assert_eq!(anthropic.matching_responses_count, 1);

    let gemini = find(&applied, BackendType::Gemini, "test");
    assert_eq!(gemini.total_responses_count, 0);
    assert_eq!(gemini.matching_responses_count, 0);
}

#[test]
fn start_bound_excludes_older_responses_from_numerator_only() {
    let now = Utc::now();
    let responses = vec![
        Response::new("test response", BackendType::OpenAi, now),
        Response::new("test response", BackendType::OpenAi, now - Duration::days(2)),
    ];
    let keywords = vec![Keyword::literal("test").with_start_bound(now - Duration::days(1))];

    let applied = engine()
        .compute_applied_keywords(&keywords, &responses)
        .unwrap();

    let openai = find(&applied, BackendType::OpenAi, "test");
    assert_eq!(openai.total_responses_count, 2);
    assert_eq!(openai.matching_responses_count, 1);
}

#[test]
fn both_bounds_are_inclusive() {
    let now = Utc::now();
    let start = now - Duration::days(2);
    let end = now - Duration::days(1);
    let responses = vec![
        Response::new("test", BackendType::Anthropic, start),
        Response::new("test", BackendType::Anthropic, end),
        Response::new("test", BackendType::Anthropic, now),
    ];
    let keywords = vec![Keyword::literal("test")
        .with_start_bound(start)
        .with_end_bound(end)];

    let applied = engine()
        .compute_applied_keywords(&keywords, &responses)
        .unwrap();

    let anthropic = find(&applied, BackendType::Anthropic, "test");
    assert_eq!(anthropic.total_responses_count, 3);
    assert_eq!(anthropic.matching_responses_count, 2);
    assert_eq!(anthropic.start_bound, Some(start));
    assert_eq!(anthropic.end_bound, Some(end));
}

#[test]
fn one_bad_pattern_fails_the_whole_batch() {
    let now = Utc::now();
    let mut keywords = sample_keywords(now);
    keywords.insert(2, Keyword::pattern("[unterminated"));

    let result = engine().compute_applied_keywords(&keywords, &sample_responses(now));

    match result {
        Err(EngineError::PatternCompilation { keyword, .. }) => {
            assert_eq!(keyword.text, "[unterminated");
        }
        other => panic!("expected PatternCompilation, got {other:?}"),
    }
}

#[test]
fn first_bad_pattern_in_input_order_is_reported() {
    let keywords = vec![
        Keyword::literal("fine"),
        Keyword::pattern("(first"),
        Keyword::pattern("second)"),
    ];
    let err = compute_applied_keywords(&keywords, &[]).unwrap_err();
    assert!(err.to_string().contains("'(first'"), "got: {err}");
}

#[test]
fn output_is_complete_cross_product() {
    let now = Utc::now();
    let keywords = sample_keywords(now);
    let applied = engine()
        .compute_applied_keywords(&keywords, &sample_responses(now))
        .unwrap();

    assert_eq!(applied.len(), keywords.len() * BackendType::ALL.len());
    for backend in BackendType::ALL {
        for keyword in &keywords {
            let count = applied
                .iter()
                .filter(|a| {
                    a.backend_type == backend
                        && a.text == keyword.text
                        && a.start_bound == keyword.start_bound
                        && a.end_bound == keyword.end_bound
                })
                .count();
            assert_eq!(count, 1, "expected one record for ({backend}, {})", keyword.text);
        }
    }
}

#[test]
fn matching_never_exceeds_total() {
    let now = Utc::now();
    let applied = engine()
        .compute_applied_keywords(&sample_keywords(now), &sample_responses(now))
        .unwrap();
    assert!(applied
        .iter()
        .all(|a| a.matching_responses_count <= a.total_responses_count));
}

#[test]
fn total_is_shared_by_every_keyword_of_a_backend() {
    let now = Utc::now();
    let responses = sample_responses(now);
    let applied = engine()
        .compute_applied_keywords(&sample_keywords(now), &responses)
        .unwrap();

    for backend in BackendType::ALL {
        let expected = responses
            .iter()
            .filter(|r| r.backend_type == backend)
            .count();
        assert!(applied
            .iter()
            .filter(|a| a.backend_type == backend)
            .all(|a| a.total_responses_count == expected));
    }
}

#[test]
fn empty_keyword_matches_every_response_of_its_backend() {
    let now = Utc::now();
    let applied = engine()
        .compute_applied_keywords(&[Keyword::literal("")], &sample_responses(now))
        .unwrap();
    assert!(applied
        .iter()
        .all(|a| a.matching_responses_count == a.total_responses_count));
}

#[test]
fn literal_and_pattern_agree_on_plain_text() {
    let now = Utc::now();
    let responses = sample_responses(now);
    for text in ["test", "refund", "days", "response", "nothing here"] {
        let literal = compute_applied_keywords(&[Keyword::literal(text)], &responses).unwrap();
        let pattern = compute_applied_keywords(&[Keyword::pattern(text)], &responses).unwrap();
        for backend in BackendType::ALL {
            assert_eq!(
                find(&literal, backend, text).matching_responses_count,
                find(&pattern, backend, text).matching_responses_count,
                "mismatch for '{text}' on {backend}"
            );
        }
    }
}

#[test]
fn counts_are_reproducible_across_runs_and_pool_sizes() {
    let now = Utc::now();
    let keywords = sample_keywords(now);
    let responses = sample_responses(now);

    let mut baseline = compute_applied_keywords(&keywords, &responses).unwrap();
    sort(&mut baseline);

    for threads in [1, 2, 8] {
        let engine = KeywordEngine::new(EngineConfig {
            worker_threads: threads,
        })
        .unwrap();
        for _ in 0..3 {
            let mut run = engine.compute_applied_keywords(&keywords, &responses).unwrap();
            sort(&mut run);
            assert_eq!(run, baseline, "diverged with {threads} threads");
        }
    }
}

#[test]
fn mixed_keywords_produce_expected_counts() {
    let now = Utc::now();
    let applied = engine()
        .compute_applied_keywords(&sample_keywords(now), &sample_responses(now))
        .unwrap();

    // "refund" since now-3d: only the gemini response from now-1d (case-sensitive).
    assert_eq!(find(&applied, BackendType::Gemini, "refund").matching_responses_count, 1);
    assert_eq!(find(&applied, BackendType::Anthropic, "refund").matching_responses_count, 1);

    // "\d+ days" up to now-1d.
    assert_eq!(find(&applied, BackendType::Gemini, r"\d+ days").matching_responses_count, 1);
    assert_eq!(find(&applied, BackendType::Anthropic, r"\d+ days").matching_responses_count, 1);
    assert_eq!(find(&applied, BackendType::OpenAi, r"\d+ days").matching_responses_count, 0);

    // Case-insensitive pattern within [now-5d, now-2d].
    assert_eq!(find(&applied, BackendType::Gemini, "(?i)refund").matching_responses_count, 1);
    assert_eq!(find(&applied, BackendType::Anthropic, "(?i)refund").matching_responses_count, 1);
}

fn sort(applied: &mut [AppliedKeyword]) {
    applied.sort_by(|a, b| {
        (a.backend_type, &a.text, a.start_bound, a.end_bound)
            .cmp(&(b.backend_type, &b.text, b.start_bound, b.end_bound))
    });
}
