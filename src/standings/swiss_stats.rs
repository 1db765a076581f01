use std::{cmp::Ordering, collections::HashMap};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::records::{Match, PlayerId, TournamentId};

/// Win/loss record of one player inside a tournament.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwissPlayerStats {
    pub player_id: PlayerId,
    /// Draws count as half a win
    pub wins: f64,
    pub losses: u32,
    pub draws: u32,
    pub points_for: i64,
    pub points_against: i64,
    /// One entry per game, so repeat pairings appear repeatedly
    pub opponents: Vec<PlayerId>
}

impl SwissPlayerStats {
    pub fn new(player_id: PlayerId) -> SwissPlayerStats {
        SwissPlayerStats {
            player_id,
            ..Default::default()
        }
    }

    pub fn point_differential(&self) -> i64 {
        self.points_for - self.points_against
    }

    /// Wins without the half points from draws.
    pub fn full_wins(&self) -> f64 {
        self.wins - 0.5 * self.draws as f64
    }

    /// Zero losses and at least one full win.
    pub fn is_undefeated(&self) -> bool {
        self.losses == 0 && self.full_wins() >= 1.0
    }

    fn record_game(&mut self, own_score: i32, other_score: i32, opponent: PlayerId) {
        self.points_for += own_score as i64;
        self.points_against += other_score as i64;
        self.opponents.push(opponent);

        match own_score.cmp(&other_score) {
            Ordering::Greater => self.wins += 1.0,
            Ordering::Less => self.losses += 1,
            Ordering::Equal => {
                self.wins += 0.5;
                self.draws += 1;
            }
        }
    }

    /// A bye is a win or a loss only. No points and no opponent.
    fn record_bye(&mut self, own_score: i32, other_score: i32) {
        if own_score > other_score {
            self.wins += 1.0;
        } else {
            self.losses += 1;
        }
    }
}

/// Stats of every player of one match set with the derived SOS and SOSOS.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwissTable {
    // First-appearance order
    stats: IndexMap<PlayerId, SwissPlayerStats>,
    sos: HashMap<PlayerId, f64>,
    sosos: HashMap<PlayerId, f64>
}

impl SwissTable {
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn stats(&self, player_id: PlayerId) -> Option<&SwissPlayerStats> {
        self.stats.get(&player_id)
    }

    pub fn players(&self) -> impl Iterator<Item = &SwissPlayerStats> {
        self.stats.values()
    }

    pub fn wins(&self, player_id: PlayerId) -> f64 {
        self.stats.get(&player_id).map(|s| s.wins).unwrap_or_default()
    }

    /// Sum of the opponents' wins.
    pub fn sos(&self, player_id: PlayerId) -> f64 {
        self.sos.get(&player_id).copied().unwrap_or_default()
    }

    /// Sum of the opponents' SOS.
    pub fn sosos(&self, player_id: PlayerId) -> f64 {
        self.sosos.get(&player_id).copied().unwrap_or_default()
    }
}

pub struct SwissStatsCalculator;

impl SwissStatsCalculator {
    /// Builds the whole table from scratch. SOS needs every player's final win
    /// count and SOSOS needs every SOS, so nothing is updated incrementally.
    pub fn calculate(matches: &[Match]) -> SwissTable {
        let mut stats: IndexMap<PlayerId, SwissPlayerStats> = IndexMap::new();

        for m in matches {
            if let Some((a, b)) = m.pairing() {
                stats
                    .entry(a)
                    .or_insert_with(|| SwissPlayerStats::new(a))
                    .record_game(m.score_a, m.score_b, b);
                stats
                    .entry(b)
                    .or_insert_with(|| SwissPlayerStats::new(b))
                    .record_game(m.score_b, m.score_a, a);
            } else if let Some((player_id, own_score, other_score)) = m.bye() {
                stats
                    .entry(player_id)
                    .or_insert_with(|| SwissPlayerStats::new(player_id))
                    .record_bye(own_score, other_score);
            }
        }

        let sos: HashMap<PlayerId, f64> = stats
            .values()
            .map(|s| {
                let total = s.opponents.iter().filter_map(|o| stats.get(o)).map(|o| o.wins).sum::<f64>();
                (s.player_id, total)
            })
            .collect();
        let sosos: HashMap<PlayerId, f64> = stats
            .values()
            .map(|s| {
                let total = s.opponents.iter().filter_map(|o| sos.get(o)).sum::<f64>();
                (s.player_id, total)
            })
            .collect();

        SwissTable { stats, sos, sosos }
    }

    /// The table of one tournament out of a mixed match list.
    pub fn calculate_tournament(matches: &[Match], tournament_id: TournamentId) -> SwissTable {
        let tournament: Vec<Match> = matches
            .iter()
            .filter(|m| m.tournament_id == Some(tournament_id))
            .cloned()
            .collect();

        SwissStatsCalculator::calculate(&tournament)
    }
}
