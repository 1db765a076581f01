use crate::{model::structures::elo_stat::EloStat, standings::individual::PlayerStanding};

/// Attaches ratings from two engine runs, typically one cut off at the start
/// of the tournament and one at its end. Players unknown to a run keep `None`.
pub fn with_ratings(standings: Vec<PlayerStanding>, before: &EloStat, after: &EloStat) -> Vec<PlayerStanding> {
    standings
        .into_iter()
        .map(|standing| PlayerStanding {
            rating_before: before.rating(standing.player_id),
            rating_after: after.rating(standing.player_id),
            ..standing
        })
        .collect()
}
