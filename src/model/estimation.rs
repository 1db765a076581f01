use serde::{Deserialize, Serialize};

use crate::model::constants::{
    ESTIMATION_CORRECTION_SHARE, ESTIMATION_DIFF_LIMIT, ESTIMATION_DIFF_SCALE, ESTIMATION_RESULT_MARGIN,
    ESTIMATION_WEIGHT_BASE, WIN_RATE_EPSILON
};

/// One rated game seen during an estimation window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub opponent_rating: f64,
    pub score: f64,
    pub weight: f64
}

impl Observation {
    pub fn new(opponent_rating: f64, score: f64) -> Observation {
        Observation {
            opponent_rating,
            score,
            weight: observation_weight(opponent_rating)
        }
    }
}

/// `sqrt(max(1000, r) / 1000)`
pub fn observation_weight(opponent_rating: f64) -> f64 {
    (opponent_rating.max(ESTIMATION_WEIGHT_BASE) / ESTIMATION_WEIGHT_BASE).sqrt()
}

/// # Performance estimate
///
/// Estimates a player's true rating from the games played in their window:
///
/// 1. Weighted average opponent rating and weighted win rate.
/// 2. `ratingDiff = clamp(100·ln(w / (1 - w)), -200, 200)`, with the win rate
///    kept inside `[ε, 1 - ε]` so a perfect or empty score stays finite.
/// 3. The estimate is bounded below by the weakest opponent lost to minus 150
///    and above by the strongest opponent beaten plus 150. Bounds without a
///    supporting result are skipped; when the bounds cross, the upper bound wins.
///
/// Returns `None` when there are no observations.
pub fn estimate_rating(observations: &[Observation]) -> Option<f64> {
    let total_weight: f64 = observations.iter().map(|o| o.weight).sum();
    if observations.is_empty() || total_weight <= 0.0 {
        return None;
    }

    let weighted_opponent = observations.iter().map(|o| o.opponent_rating * o.weight).sum::<f64>() / total_weight;
    let win_rate = (observations.iter().map(|o| o.score * o.weight).sum::<f64>() / total_weight)
        .clamp(WIN_RATE_EPSILON, 1.0 - WIN_RATE_EPSILON);

    let rating_diff = (ESTIMATION_DIFF_SCALE * (win_rate / (1.0 - win_rate)).ln())
        .clamp(-ESTIMATION_DIFF_LIMIT, ESTIMATION_DIFF_LIMIT);
    let mut estimated = weighted_opponent + rating_diff;

    let weakest_lost_to = observations
        .iter()
        .filter(|o| o.score == 0.0)
        .map(|o| o.opponent_rating)
        .reduce(f64::min);
    let strongest_beaten = observations
        .iter()
        .filter(|o| o.score == 1.0)
        .map(|o| o.opponent_rating)
        .reduce(f64::max);

    if let Some(lower) = weakest_lost_to {
        estimated = estimated.max(lower - ESTIMATION_RESULT_MARGIN);
    }
    if let Some(upper) = strongest_beaten {
        estimated = estimated.min(upper + ESTIMATION_RESULT_MARGIN);
    }

    Some(estimated)
}

/// The share of the gap between estimate and initial rating applied at window close.
pub fn estimation_correction(estimated: f64, initial_rating: f64) -> f64 {
    (estimated - initial_rating) * ESTIMATION_CORRECTION_SHARE
}
