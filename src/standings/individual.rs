use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};

use crate::{
    model::records::PlayerId,
    standings::{
        assign_positions, display_key, published_position,
        swiss_stats::{SwissPlayerStats, SwissTable}
    }
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStanding {
    pub player_id: PlayerId,
    pub stats: SwissPlayerStats,
    pub sos: f64,
    pub sosos: f64,
    pub undefeated: bool,
    pub computed_position: Option<u32>,
    /// Position persisted outside the engine; authoritative when present
    pub saved_position: Option<u32>,
    pub rating_before: Option<f64>,
    pub rating_after: Option<f64>
}

impl PlayerStanding {
    pub fn position(&self) -> Option<u32> {
        self.saved_position.or(self.computed_position)
    }

    fn tied_with(&self, other: &PlayerStanding) -> bool {
        self.stats.wins == other.stats.wins && self.sos == other.sos && self.sosos == other.sosos
    }
}

/// # Individual order
///
/// 1. Undefeated players (no losses, at least one win)
/// 2. Wins, descending
/// 3. SOS, descending
/// 4. SOSOS, descending
/// 5. Point differential, descending
/// 6. Player id, ascending, so the order never depends on input order
pub fn compare_players(a: &PlayerStanding, b: &PlayerStanding) -> Ordering {
    b.undefeated
        .cmp(&a.undefeated)
        .then(b.stats.wins.total_cmp(&a.stats.wins))
        .then(b.sos.total_cmp(&a.sos))
        .then(b.sosos.total_cmp(&a.sosos))
        .then(b.stats.point_differential().cmp(&a.stats.point_differential()))
        .then(a.player_id.cmp(&b.player_id))
}

/// Ranks every player of `table`. All undefeated players share position 1;
/// players tied on wins, SOS and SOSOS share their predecessor's position.
///
/// The result is in display order: saved position where one exists, else the
/// computed one. Saved positions are only replaced when `overwrite_saved` is set.
pub fn rank_players(
    table: &SwissTable,
    saved_positions: &HashMap<PlayerId, u32>,
    overwrite_saved: bool
) -> Vec<PlayerStanding> {
    let mut standings: Vec<PlayerStanding> = table
        .players()
        .map(|stats| PlayerStanding {
            player_id: stats.player_id,
            stats: stats.clone(),
            sos: table.sos(stats.player_id),
            sosos: table.sosos(stats.player_id),
            undefeated: stats.is_undefeated(),
            computed_position: None,
            saved_position: saved_positions.get(&stats.player_id).copied(),
            rating_before: None,
            rating_after: None
        })
        .collect();
    standings.sort_by(compare_players);

    let positions = assign_positions(&standings, |s| s.undefeated, |a, b| a.tied_with(b));
    for (standing, position) in standings.iter_mut().zip(positions) {
        standing.computed_position = Some(position);
        standing.saved_position =
            published_position(standing.saved_position, standing.computed_position, overwrite_saved);
    }

    // Stable, so equal keys keep the computed order
    standings.sort_by_key(|s| display_key(s.saved_position, s.computed_position));
    standings
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::{
        standings::{individual::rank_players, swiss_stats::SwissStatsCalculator},
        utils::test_utils::{generate_round_robin, generate_tournament_match}
    };

    #[test]
    fn test_round_robin_scenario() {
        // Player 4 beats everyone, 1 beats 2 and 3, 2 beats 3
        let table = SwissStatsCalculator::calculate(&generate_round_robin(1, &[4, 1, 2, 3]));
        let standings = rank_players(&table, &HashMap::new(), false);

        let order: Vec<_> = standings.iter().map(|s| (s.player_id, s.position())).collect();
        assert_eq!(order, vec![(4, Some(1)), (1, Some(2)), (2, Some(3)), (3, Some(4))]);
        assert!(standings[0].undefeated);
        assert!(standings[1..].iter().all(|s| !s.undefeated));
    }

    #[test]
    fn test_co_champions_and_ties() {
        let matches = vec![
            generate_tournament_match(1, 1, 1, 1, 2, 2, 0),
            generate_tournament_match(2, 1, 1, 3, 4, 1, 0)
        ];
        let table = SwissStatsCalculator::calculate(&matches);
        let standings = rank_players(&table, &HashMap::new(), false);

        let order: Vec<_> = standings.iter().map(|s| (s.player_id, s.position())).collect();
        // 4 lost by a smaller margin than 2, so sorts ahead but shares the position
        assert_eq!(order, vec![(1, Some(1)), (3, Some(1)), (4, Some(3)), (2, Some(3))]);
    }

    #[test]
    fn test_draws_alone_are_not_undefeated() {
        let matches = vec![
            generate_tournament_match(1, 1, 1, 1, 2, 1, 1),
            generate_tournament_match(2, 1, 2, 1, 4, 1, 1),
            generate_tournament_match(3, 1, 1, 3, 4, 1, 0),
            generate_tournament_match(4, 1, 2, 3, 2, 1, 0),
            generate_tournament_match(5, 1, 3, 3, 5, 1, 0),
            generate_tournament_match(6, 1, 4, 3, 6, 0, 1)
        ];
        let table = SwissStatsCalculator::calculate(&matches);
        let standings = rank_players(&table, &HashMap::new(), false);

        let drawer = standings.iter().find(|s| s.player_id == 1).unwrap();
        assert_eq!(drawer.stats.wins, 1.0);
        assert!(!drawer.undefeated);

        // 3-1 outranks two draws
        let order: Vec<_> = standings.iter().map(|s| s.player_id).collect();
        let pos = |id| order.iter().position(|p| *p == id).unwrap();
        assert!(pos(3) < pos(1));
        assert_ne!(drawer.position(), Some(1));
    }

    #[test]
    fn test_saved_positions_take_precedence() {
        let table = SwissStatsCalculator::calculate(&generate_round_robin(1, &[1, 2, 3]));
        let saved = HashMap::from([(3, 1)]);

        let standings = rank_players(&table, &saved, false);
        let order: Vec<_> = standings
            .iter()
            .map(|s| (s.player_id, s.saved_position, s.computed_position))
            .collect();

        // Player 3 keeps the manual first place alongside player 1's computed one
        assert_eq!(
            order,
            vec![(1, None, Some(1)), (3, Some(1), Some(3)), (2, None, Some(2))]
        );
        assert_eq!(standings[1].position(), Some(1));
    }

    #[test]
    fn test_overwrite_replaces_saved_positions() {
        let table = SwissStatsCalculator::calculate(&generate_round_robin(1, &[1, 2, 3]));
        let saved = HashMap::from([(3, 1)]);

        let standings = rank_players(&table, &saved, true);
        let order: Vec<_> = standings.iter().map(|s| (s.player_id, s.position())).collect();

        assert_eq!(order, vec![(1, Some(1)), (2, Some(2)), (3, Some(3))]);
    }
}
