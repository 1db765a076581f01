use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::model::{
    promotion::PromotionEvent,
    structures::{player_class::PlayerClass, rank::Rank, rating_adjustment_type::RatingAdjustmentType}
};

pub type PlayerId = i32;
pub type TeamId = i32;
pub type MatchId = i32;
pub type TournamentId = i32;

/// A single played game as supplied by the match source. Either side may be
/// absent, which denotes a bye.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub player_a: Option<PlayerId>,
    pub player_b: Option<PlayerId>,
    pub timestamp: DateTime<FixedOffset>,
    pub score_a: i32,
    pub score_b: i32,
    /// Scales rating impact; 0 marks byes and unrated games
    #[serde(default = "default_factor")]
    pub factor: f64,
    #[serde(default)]
    pub tournament_id: Option<TournamentId>,
    #[serde(default)]
    pub round: Option<u32>,
    /// Organizer / event label, used by the subset filter
    #[serde(default)]
    pub name: String
}

fn default_factor() -> f64 {
    1.0
}

impl Match {
    pub fn is_rated(&self) -> bool {
        self.factor > 0.0
    }

    /// Both players when this is a real game (not a bye).
    pub fn pairing(&self) -> Option<(PlayerId, PlayerId)> {
        match (self.player_a, self.player_b) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None
        }
    }

    /// The present player of a bye, with their score and the absent side's score.
    pub fn bye(&self) -> Option<(PlayerId, i32, i32)> {
        match (self.player_a, self.player_b) {
            (Some(a), None) => Some((a, self.score_a, self.score_b)),
            (None, Some(b)) => Some((b, self.score_b, self.score_a)),
            _ => None
        }
    }

    /// Elo actual score for side A: 1 for a win, 0.5 for a draw, 0 for a loss.
    pub fn actual_score_a(&self) -> f64 {
        match self.score_a.cmp(&self.score_b) {
            std::cmp::Ordering::Greater => 1.0,
            std::cmp::Ordering::Equal => 0.5,
            std::cmp::Ordering::Less => 0.0
        }
    }
}

/// Classification and rank data for one player, supplied by the metadata source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMetadata {
    pub player_id: PlayerId,
    #[serde(default)]
    pub class: PlayerClass,
    #[serde(default)]
    pub rank: Option<Rank>,
    #[serde(default)]
    pub initial_rating: Option<f64>,
    #[serde(default)]
    pub pro: bool,
    #[serde(default)]
    pub promotions: Vec<PromotionEvent>
}

impl PlayerMetadata {
    /// Metadata for a player nobody knows anything about.
    pub fn unknown(player_id: PlayerId) -> PlayerMetadata {
        PlayerMetadata {
            player_id,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingAdjustment {
    pub player_id: PlayerId,
    pub match_id: Option<MatchId>,
    pub rating_before: f64,
    pub rating_after: f64,
    pub timestamp: DateTime<FixedOffset>,
    pub adjustment_type: RatingAdjustmentType
}

impl RatingAdjustment {
    pub fn rating_delta(&self) -> f64 {
        self.rating_after - self.rating_before
    }
}

/// Audit entry for one processed match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRatingChange {
    pub match_id: MatchId,
    pub player_a: PlayerId,
    pub player_b: PlayerId,
    pub rating_before_a: f64,
    pub rating_before_b: f64,
    pub shift_a: f64,
    pub shift_b: f64,
    /// Effective K after regime multipliers, protection and the match factor
    pub k_a: f64,
    pub k_b: f64,
    pub rated: bool
}
