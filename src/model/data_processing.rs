use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{error::EngineError, model::records::Match};

/// Inclusive date bounds of one replay. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayWindow {
    pub start: Option<DateTime<FixedOffset>>,
    pub cutoff: Option<DateTime<FixedOffset>>
}

impl ReplayWindow {
    pub fn until(cutoff: DateTime<FixedOffset>) -> ReplayWindow {
        ReplayWindow {
            start: None,
            cutoff: Some(cutoff)
        }
    }

    pub fn contains(&self, timestamp: DateTime<FixedOffset>) -> bool {
        self.start.map_or(true, |start| timestamp >= start) && self.cutoff.map_or(true, |cutoff| timestamp <= cutoff)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        match (self.start, self.cutoff) {
            (Some(start), Some(cutoff)) if start > cutoff => Err(EngineError::InvalidWindow),
            _ => Ok(())
        }
    }
}

/// Rejects input the replay cannot recover from. Runs over the whole input
/// before any filtering so a bad record outside the window is still reported.
pub fn validate_matches(matches: &[Match]) -> Result<(), EngineError> {
    let mut seen = HashSet::with_capacity(matches.len());

    for m in matches {
        if !seen.insert(m.id) {
            return Err(EngineError::DuplicateMatch { match_id: m.id });
        }
        if m.score_a < 0 || m.score_b < 0 {
            return Err(EngineError::NegativeScore { match_id: m.id });
        }
        if !m.factor.is_finite() || m.factor < 0.0 {
            return Err(EngineError::InvalidFactor { match_id: m.id });
        }
        match (m.player_a, m.player_b) {
            (None, None) => return Err(EngineError::EmptyMatch { match_id: m.id }),
            (Some(a), Some(b)) if a == b => return Err(EngineError::SelfPairing { match_id: m.id }),
            _ => {}
        }
    }

    Ok(())
}

/// Case-insensitive substring match on the match name. No filter lets every
/// match through.
pub fn matches_subset(m: &Match, subset: Option<&str>) -> bool {
    match subset {
        Some(filter) if !filter.is_empty() => m.name.to_lowercase().contains(&filter.to_lowercase()),
        _ => true
    }
}

pub fn filter_matches(matches: &[Match], window: &ReplayWindow, subset: Option<&str>) -> Vec<Match> {
    matches
        .iter()
        .filter(|m| window.contains(m.timestamp) && matches_subset(m, subset))
        .cloned()
        .collect()
}

/// Sorts by timestamp, keeping input order for equal timestamps. Returns
/// true when the caller handed over unsorted matches.
pub fn order_matches(matches: &mut [Match]) -> bool {
    if matches.windows(2).all(|w| w[0].timestamp <= w[1].timestamp) {
        return false;
    }

    warn!(
        count = matches.len(),
        "Matches were not supplied in chronological order, sorting before replay"
    );
    matches.sort_by_key(|m| m.timestamp);
    true
}

/// Validate, filter and order in one pass, ready for replay.
pub fn prepare_matches(
    matches: &[Match],
    window: &ReplayWindow,
    subset: Option<&str>
) -> Result<Vec<Match>, EngineError> {
    window.validate()?;
    validate_matches(matches)?;

    let mut filtered = filter_matches(matches, window, subset);
    order_matches(&mut filtered);

    Ok(filtered)
}
