use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::model::{
    records::{MatchId, PlayerId, RatingAdjustment},
    structures::rating_adjustment_type::RatingAdjustmentType
};

/// One row of a leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub player_id: PlayerId,
    pub rating: f64,
    pub rank: i32,
    pub percentile: f64
}

/// Current rating and adjustment history of every player seen during a replay.
#[derive(Debug, Default)]
pub struct RatingTracker {
    // Insertion order is first appearance in the replay
    ratings: IndexMap<PlayerId, f64>,
    adjustments: IndexMap<PlayerId, Vec<RatingAdjustment>>
}

impl RatingTracker {
    pub fn new() -> RatingTracker {
        RatingTracker::default()
    }

    /// Records the rating a player enters the replay with. Later calls for the
    /// same player are ignored.
    pub fn track_initial(&mut self, player_id: PlayerId, rating: f64, timestamp: DateTime<FixedOffset>) {
        if self.ratings.contains_key(&player_id) {
            return;
        }

        self.ratings.insert(player_id, rating);
        self.adjustments.insert(
            player_id,
            vec![RatingAdjustment {
                player_id,
                match_id: None,
                rating_before: rating,
                rating_after: rating,
                timestamp,
                adjustment_type: RatingAdjustmentType::Initial
            }]
        );
    }

    /// Moves a player to `rating` and appends the adjustment. A player never
    /// seen before is tracked with `rating` as their initial value.
    pub fn insert_or_update(
        &mut self,
        player_id: PlayerId,
        rating: f64,
        adjustment_type: RatingAdjustmentType,
        match_id: Option<MatchId>,
        timestamp: DateTime<FixedOffset>
    ) {
        let Some(rating_before) = self.get_rating(player_id) else {
            self.track_initial(player_id, rating, timestamp);
            return;
        };

        self.ratings.insert(player_id, rating);
        self.adjustments.entry(player_id).or_default().push(RatingAdjustment {
            player_id,
            match_id,
            rating_before,
            rating_after: rating,
            timestamp,
            adjustment_type
        });
    }

    pub fn get_rating(&self, player_id: PlayerId) -> Option<f64> {
        self.ratings.get(&player_id).copied()
    }

    pub fn get_rating_adjustments(&self, player_id: PlayerId) -> Option<&Vec<RatingAdjustment>> {
        self.adjustments.get(&player_id)
    }

    pub fn into_adjustments(self) -> IndexMap<PlayerId, Vec<RatingAdjustment>> {
        self.adjustments
    }

    /// Sorts `ratings` by rating descending and assigns rank and percentile.
    /// Equal ratings are ordered by player id so the table is reproducible.
    pub fn leaderboard(ratings: impl IntoIterator<Item = (PlayerId, f64)>) -> Vec<LeaderboardEntry> {
        let sorted = ratings
            .into_iter()
            .sorted_by(|(id_a, a), (id_b, b)| b.total_cmp(a).then(id_a.cmp(id_b)))
            .collect_vec();
        let count = sorted.len() as i32;

        sorted
            .into_iter()
            .enumerate()
            .map(|(i, (player_id, rating))| {
                let rank = i as i32 + 1;
                LeaderboardEntry {
                    player_id,
                    rating,
                    rank,
                    percentile: RatingTracker::percentile(rank, count).unwrap_or_default()
                }
            })
            .collect()
    }

    /// `P = (n/N) * 100`
    pub fn percentile(rank: i32, total: i32) -> Option<f64> {
        match rank.cmp(&1) {
            Ordering::Less => None,
            _ => {
                let n = total - rank; // The number of players below the player
                Some(n as f64 / total as f64 * 100.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::{
        model::{rating_tracker::RatingTracker, structures::rating_adjustment_type::RatingAdjustmentType},
        utils::test_utils::timestamp
    };

    #[test]
    fn test_track_player_initial_rating_and_match_update() {
        let mut rating_tracker = RatingTracker::new();
        rating_tracker.track_initial(1, 1500.0, timestamp(0));

        let adjustments = rating_tracker.get_rating_adjustments(1).unwrap();
        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].adjustment_type, RatingAdjustmentType::Initial);
        assert_eq!(adjustments[0].rating_delta(), 0.0);

        rating_tracker.insert_or_update(1, 1516.0, RatingAdjustmentType::Match, Some(7), timestamp(1));

        let adjustments = rating_tracker.get_rating_adjustments(1).unwrap();
        assert_eq!(rating_tracker.get_rating(1), Some(1516.0));
        assert_eq!(adjustments.len(), 2);
        assert_eq!(adjustments[1].match_id, Some(7));
        assert_eq!(adjustments[1].rating_before, 1500.0);
        assert_eq!(adjustments[1].rating_delta(), 16.0);
    }

    #[test]
    fn test_initial_is_recorded_once() {
        let mut rating_tracker = RatingTracker::new();
        rating_tracker.track_initial(1, 1500.0, timestamp(0));
        rating_tracker.track_initial(1, 1800.0, timestamp(1));

        assert_eq!(rating_tracker.get_rating(1), Some(1500.0));
        assert_eq!(rating_tracker.get_rating_adjustments(1).unwrap().len(), 1);
    }

    #[test]
    fn test_update_of_unknown_player_is_initial() {
        let mut rating_tracker = RatingTracker::new();
        rating_tracker.insert_or_update(3, 1400.0, RatingAdjustmentType::Match, Some(1), timestamp(0));

        let adjustments = rating_tracker.get_rating_adjustments(3).unwrap();
        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].adjustment_type, RatingAdjustmentType::Initial);
    }

    #[test]
    fn test_leaderboard_update() {
        let leaderboard = RatingTracker::leaderboard(vec![(1, 100.0), (2, 200.0), (3, 200.0)]);

        // Sorted by rating descending, ties by id
        assert_eq!(leaderboard.len(), 3);
        assert_eq!(leaderboard[0].player_id, 2);
        assert_eq!(leaderboard[1].player_id, 3);
        assert_eq!(leaderboard[2].player_id, 1);
        assert_eq!(leaderboard[2].rank, 3);

        assert_abs_diff_eq!(leaderboard[0].percentile, RatingTracker::percentile(1, 3).unwrap());
        assert_abs_diff_eq!(leaderboard[2].percentile, 0.0);
    }

    #[test]
    fn test_percentile() {
        assert_eq!(RatingTracker::percentile(0, 10), None);
        assert_eq!(RatingTracker::percentile(-1, 10), None);

        assert_eq!(RatingTracker::percentile(1, 1), Some(0.0));

        assert_abs_diff_eq!(RatingTracker::percentile(1, 2).unwrap(), 50.0, epsilon = 0.0001);
        assert_abs_diff_eq!(RatingTracker::percentile(2, 2).unwrap(), 0.0, epsilon = 0.0001);

        assert_abs_diff_eq!(RatingTracker::percentile(1, 10).unwrap(), 90.0, epsilon = 0.0001);
        assert_abs_diff_eq!(RatingTracker::percentile(1, 100).unwrap(), 99.0, epsilon = 0.0001);
        assert_abs_diff_eq!(RatingTracker::percentile(1, 1000).unwrap(), 99.9, epsilon = 0.0001);
        assert_abs_diff_eq!(RatingTracker::percentile(1, 10000).unwrap(), 99.99, epsilon = 0.0001);
    }
}
