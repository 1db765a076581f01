use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{
    player_state::PlayerRatingState,
    promotion::PromotionBonus,
    rating_tracker::{LeaderboardEntry, RatingTracker},
    records::{MatchId, MatchRatingChange, PlayerId, RatingAdjustment}
};

/// Everything one engine run produced. Built fresh per run and never shared
/// between runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EloStat {
    pub cutoff: Option<DateTime<FixedOffset>>,
    /// Final ratings in order of first appearance
    pub ratings: IndexMap<PlayerId, f64>,
    /// Players with at least one rated match inside the window
    pub active: BTreeSet<PlayerId>,
    /// Players still inside a long estimation window
    pub hidden: BTreeSet<PlayerId>,
    pub match_changes: Vec<MatchRatingChange>,
    pub adjustments: IndexMap<PlayerId, Vec<RatingAdjustment>>,
    pub promotion_bonuses: Vec<PromotionBonus>,
    /// Final replay state per player, for detailed lookup
    #[serde(skip)]
    pub players: IndexMap<PlayerId, PlayerRatingState>
}

impl EloStat {
    pub fn rating(&self, player_id: PlayerId) -> Option<f64> {
        self.ratings.get(&player_id).copied()
    }

    /// Detailed lookup. Hidden players are visible here.
    pub fn player(&self, player_id: PlayerId) -> Option<&PlayerRatingState> {
        self.players.get(&player_id)
    }

    pub fn match_change(&self, match_id: MatchId) -> Option<&MatchRatingChange> {
        self.match_changes.iter().find(|c| c.match_id == match_id)
    }

    /// Primary leaderboard. Hidden players never appear; with `active_only`
    /// players without a rated match in the window are left out too.
    pub fn leaderboard(&self, active_only: bool) -> Vec<LeaderboardEntry> {
        RatingTracker::leaderboard(
            self.ratings
                .iter()
                .filter(|(id, _)| !self.hidden.contains(id))
                .filter(|(id, _)| !active_only || self.active.contains(id))
                .map(|(id, rating)| (*id, *rating))
        )
    }
}
