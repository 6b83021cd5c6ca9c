//! Retrieval quality assessment.
//!
//! Deterministic, pure classification of a scored fragment sequence into
//! a coarse quality tier, with a diagnostic recommendation the caller
//! can log or surface. The intent sets the bar: job-search hits span a
//! broad corpus and need higher similarity to be trustworthy, while
//! profile- and position-scoped hits are already narrowed by identity.

use counsel_vector::ScoredFragment;

use crate::types::{Intent, Quality, QualityReport};

/// (good, acceptable) score bars per intent.
fn quality_bars(intent: Intent) -> (f32, f32) {
    match intent {
        Intent::JobSearch => (0.70, 0.50),
        Intent::ProfileAnalysis | Intent::PositionAnalysis => (0.60, 0.40),
        // Default bars for anything without a tuned pair
        Intent::General => (0.60, 0.40),
    }
}

/// Assess a fragment sequence for the given intent.
pub fn assess(fragments: &[ScoredFragment], intent: Intent) -> QualityReport {
    if fragments.is_empty() {
        return QualityReport {
            quality: Quality::Poor,
            max_score: 0.0,
            avg_score: 0.0,
            count: 0,
            recommendation: "No results retrieved - relax filters or expand the query".to_string(),
        };
    }

    let max_score = fragments.iter().map(|f| f.score).fold(f32::MIN, f32::max);
    let avg_score = fragments.iter().map(|f| f.score).sum::<f32>() / fragments.len() as f32;

    let (good, acceptable) = quality_bars(intent);
    let (quality, recommendation) = if max_score >= good {
        (
            Quality::Good,
            "Strong matches - context can be trusted".to_string(),
        )
    } else if max_score >= acceptable {
        (
            Quality::Acceptable,
            "Moderate matches - answer with hedging where context is thin".to_string(),
        )
    } else {
        (
            Quality::Poor,
            "Weak matches - consider rephrasing the query or widening the search".to_string(),
        )
    };

    QualityReport {
        quality,
        max_score,
        avg_score,
        count: fragments.len(),
        recommendation,
    }
}
