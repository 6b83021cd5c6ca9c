//! Adaptive retrieval parameter selection.
//!
//! Pure function from (intent, query length, filter specificity) to
//! result-count budgets and similarity thresholds. The reasoning: a
//! query scoped to one known profile or position is already narrowed by
//! identity, so it can tolerate a lower similarity bar, whereas an
//! unscoped corpus-wide search needs a stricter bar to avoid noise.

use tracing::debug;

use crate::types::{Intent, RetrievalParams};

/// Flat threshold when an identity filter already narrows the search.
pub const SCOPED_THRESHOLD: f32 = 0.30;

/// Queries longer than this get widened budgets.
const LONG_QUERY_WORDS: usize = 15;

/// Budget caps after the long-query widening.
const PROFILE_LIMIT_CAP: usize = 10;
const POSITION_LIMIT_CAP: usize = 7;

/// Unscoped similarity threshold for an intent.
fn unscoped_threshold(intent: Intent) -> f32 {
    match intent {
        Intent::ProfileAnalysis => 0.40,
        Intent::JobSearch => 0.50,
        Intent::PositionAnalysis => 0.40,
        Intent::General => 0.35,
    }
}

/// Base (profile, position) budgets for an intent.
fn base_budgets(intent: Intent) -> (usize, usize) {
    match intent {
        Intent::ProfileAnalysis => (8, 0),
        Intent::JobSearch => (5, 5),
        Intent::PositionAnalysis => (5, 2),
        Intent::General => (3, 3),
    }
}

/// Select budgets and thresholds for one retrieval call.
///
/// `has_specific_id_filter` refers to the profile side: whether the
/// search is narrowed to a known profile or candidate. JobSearch's
/// position side is always treated as unscoped even when the profile
/// side is scoped, since the position corpus is searched broadly
/// regardless.
pub fn select_params(
    intent: Intent,
    query_word_count: usize,
    has_specific_id_filter: bool,
) -> RetrievalParams {
    let (mut profile_limit, mut position_limit) = base_budgets(intent);

    // Longer questions plausibly span more topics and benefit from
    // wider context.
    if query_word_count > LONG_QUERY_WORDS {
        profile_limit = (profile_limit + 2).min(PROFILE_LIMIT_CAP);
        position_limit = (position_limit + 1).min(POSITION_LIMIT_CAP);
    }

    let profile_threshold = if has_specific_id_filter {
        SCOPED_THRESHOLD
    } else {
        unscoped_threshold(intent)
    };

    let position_threshold = if intent == Intent::JobSearch {
        unscoped_threshold(Intent::JobSearch)
    } else if has_specific_id_filter {
        SCOPED_THRESHOLD
    } else {
        unscoped_threshold(intent)
    };

    let params = RetrievalParams {
        profile_limit,
        position_limit,
        profile_threshold,
        position_threshold,
    };

    debug!(
        intent = intent.as_str(),
        word_count = query_word_count,
        scoped = has_specific_id_filter,
        profile_limit = params.profile_limit,
        position_limit = params.position_limit,
        profile_threshold = params.profile_threshold,
        position_threshold = params.position_threshold,
        "Selected retrieval parameters"
    );

    params
}
