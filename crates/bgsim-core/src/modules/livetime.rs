use crate::domain::{EvaluationError, Match, MatchRequest};
use crate::numerics::stable_sum_iter;

/// Saturates at `u64::MAX` instead of overflowing on huge corpora.
pub fn total_primaries(matched: &Match) -> u64 {
    matched
        .documents
        .iter()
        .fold(0u64, |total, doc| total.saturating_add(doc.nprimaries))
}

/// Simulated exposure of a match: total primaries over the emission rate.
///
/// The rate is used as registered on the match; no weighting or unit
/// conversion happens here. An empty match has zero livetime.
pub fn livetime(matched: &Match) -> Result<f64, EvaluationError> {
    if matched.emission_rate == 0.0 {
        return Err(EvaluationError::ZeroEmissionRate);
    }
    Ok(total_primaries(matched) as f64 / matched.emission_rate)
}

/// Summed livetime of every match in `requests` whose query asked for
/// `primary`. Matches registered with a zero emission rate are skipped.
pub fn component_livetime(requests: &[MatchRequest], primary: &str) -> f64 {
    stable_sum_iter(
        requests
            .iter()
            .flat_map(|request| request.matches.iter())
            .filter(|matched| matched.query.primary.as_deref() == Some(primary))
            .filter_map(|matched| match livetime(matched) {
                Ok(value) => Some(value),
                Err(error) => {
                    tracing::debug!(primary, %error, "skipping match in livetime sum");
                    None
                }
            }),
    )
}
