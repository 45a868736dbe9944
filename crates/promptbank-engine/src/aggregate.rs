use promptbank_core::{AppliedKeyword, Keyword};

use crate::partition::Partition;
use crate::predicate::KeywordPredicate;

/// Count how many members of `partition` satisfy `predicate`.
///
/// `keyword` must be the keyword `predicate` was built from; its text and
/// bounds are echoed unchanged into the result.
#[must_use]
pub fn aggregate(
    partition: &Partition<'_>,
    keyword: &Keyword,
    predicate: &KeywordPredicate,
) -> AppliedKeyword {
    let total_responses_count = partition.len();
    let matching_responses_count = partition.iter().filter(|r| predicate.matches(r)).count();

    AppliedKeyword {
        backend_type: partition.backend_type(),
        text: keyword.text.clone(),
        start_bound: keyword.start_bound,
        end_bound: keyword.end_bound,
        total_responses_count,
        matching_responses_count,
    }
}
