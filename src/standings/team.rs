use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap}
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    model::records::{Match, PlayerId, TeamId},
    standings::{assign_positions, display_key, individual::PlayerStanding, published_position}
};

// Personal-award mode
const COUNTED_MEMBERS: usize = 3;
const MIN_QUALIFYING_MEMBERS: usize = 2;

// Team mode, per game
const WIN_POINTS: f64 = 1.0;
const DRAW_POINTS: f64 = 0.5;
const MAIN_MATCH_WIN_BONUS: f64 = 0.5;
const MAIN_MATCH_DRAW_BONUS: f64 = 0.25;

/// How a tournament turns results into team standings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TeamScoringMode {
    /// Sum of the three best individual positions
    #[strum(serialize = "personal")]
    PersonalAward,
    /// Team-vs-team round results with a main match bonus
    #[strum(serialize = "team")]
    Team
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberResult {
    pub player_id: PlayerId,
    pub position: Option<u32>,
    pub wins: f64,
    pub sos: f64,
    pub sosos: f64,
    /// Counts towards the team score in personal-award mode
    pub counted: bool
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStanding {
    pub team_id: TeamId,
    pub mode: TeamScoringMode,
    /// Best individual position first
    pub members: Vec<TeamMemberResult>,
    /// Position sum (lower is better) or round wins (higher is better)
    pub score: f64,
    pub sos: f64,
    pub sosos: f64,
    pub member_wins: f64,
    /// False for teams excluded from the ranking
    pub ranked: bool,
    pub computed_position: Option<u32>,
    pub saved_position: Option<u32>
}

impl TeamStanding {
    pub fn position(&self) -> Option<u32> {
        self.saved_position.or(self.computed_position)
    }

    fn tied_with(&self, other: &TeamStanding) -> bool {
        self.score == other.score
            && self.sos == other.sos
            && self.sosos == other.sosos
            && self.member_wins == other.member_wins
    }
}

/// Ranks the teams of `roster` in the given mode. `players` must be the
/// individual standings of the same `matches`.
///
/// Like individual standings, the result is in display order and saved
/// positions are kept unless `overwrite_saved` is set.
pub fn rank_teams(
    matches: &[Match],
    players: &[PlayerStanding],
    roster: &HashMap<PlayerId, TeamId>,
    mode: TeamScoringMode,
    saved_positions: &HashMap<TeamId, u32>,
    overwrite_saved: bool
) -> Vec<TeamStanding> {
    let mut standings = match mode {
        TeamScoringMode::PersonalAward => personal_award_standings(players, roster),
        TeamScoringMode::Team => team_round_standings(matches, players, roster)
    };
    standings.sort_by(compare_teams);

    // Excluded teams sort last and never take a position
    let ranked_count = standings.iter().take_while(|s| s.ranked).count();
    let positions = assign_positions(&standings[..ranked_count], |_| false, |a, b| a.tied_with(b));
    for (standing, position) in standings.iter_mut().zip(positions) {
        standing.computed_position = Some(position);
    }
    for standing in standings.iter_mut() {
        standing.saved_position = published_position(
            saved_positions.get(&standing.team_id).copied(),
            standing.computed_position,
            overwrite_saved
        );
    }

    standings.sort_by_key(|s| display_key(s.saved_position, s.computed_position));
    standings
}

/// # Team order
///
/// Personal-award mode: lowest position sum, then SOS and SOSOS of the counted
/// members, then total member wins.
///
/// Team mode: most round wins, then team SOS, team SOSOS and total member wins.
///
/// Ranked teams always come before excluded ones; team id breaks what is left.
pub fn compare_teams(a: &TeamStanding, b: &TeamStanding) -> Ordering {
    let score = match a.mode {
        TeamScoringMode::PersonalAward => a.score.total_cmp(&b.score),
        TeamScoringMode::Team => b.score.total_cmp(&a.score)
    };

    b.ranked
        .cmp(&a.ranked)
        .then(score)
        .then(b.sos.total_cmp(&a.sos))
        .then(b.sosos.total_cmp(&a.sosos))
        .then(b.member_wins.total_cmp(&a.member_wins))
        .then(a.team_id.cmp(&b.team_id))
}

fn members_by_team(
    players: &[PlayerStanding],
    roster: &HashMap<PlayerId, TeamId>
) -> BTreeMap<TeamId, Vec<TeamMemberResult>> {
    let mut teams: BTreeMap<TeamId, Vec<TeamMemberResult>> = roster.values().map(|t| (*t, Vec::new())).collect();

    for p in players {
        if let Some(team_id) = roster.get(&p.player_id) {
            teams.entry(*team_id).or_default().push(TeamMemberResult {
                player_id: p.player_id,
                position: p.position(),
                wins: p.stats.wins,
                sos: p.sos,
                sosos: p.sosos,
                counted: false
            });
        }
    }

    for members in teams.values_mut() {
        members.sort_by(|a, b| {
            a.position
                .unwrap_or(u32::MAX)
                .cmp(&b.position.unwrap_or(u32::MAX))
                .then(a.player_id.cmp(&b.player_id))
        });
    }

    teams
}

/// Teams with fewer than two placed members are excluded. A team with only
/// two placed members is charged the tournament's player count for the third.
fn personal_award_standings(players: &[PlayerStanding], roster: &HashMap<PlayerId, TeamId>) -> Vec<TeamStanding> {
    let penalty = players.len() as f64;

    members_by_team(players, roster)
        .into_iter()
        .map(|(team_id, mut members)| {
            for member in members.iter_mut().filter(|m| m.position.is_some()).take(COUNTED_MEMBERS) {
                member.counted = true;
            }

            let counted: Vec<&TeamMemberResult> = members.iter().filter(|m| m.counted).collect();
            let missing = COUNTED_MEMBERS - counted.len();
            let position_sum: f64 = counted.iter().filter_map(|m| m.position).map(|p| p as f64).sum();

            TeamStanding {
                team_id,
                mode: TeamScoringMode::PersonalAward,
                score: position_sum + missing as f64 * penalty,
                sos: counted.iter().map(|m| m.sos).sum(),
                sosos: counted.iter().map(|m| m.sosos).sum(),
                member_wins: members.iter().map(|m| m.wins).sum(),
                ranked: counted.len() >= MIN_QUALIFYING_MEMBERS,
                members,
                computed_position: None,
                saved_position: None
            }
        })
        .collect()
}

/// Base game points plus the main match bonus, for side A and side B.
fn game_points(score_a: i32, score_b: i32, main: bool) -> (f64, f64) {
    let (bonus_win, bonus_draw) = if main {
        (MAIN_MATCH_WIN_BONUS, MAIN_MATCH_DRAW_BONUS)
    } else {
        (0.0, 0.0)
    };

    match score_a.cmp(&score_b) {
        Ordering::Greater => (WIN_POINTS + bonus_win, 0.0),
        Ordering::Less => (0.0, WIN_POINTS + bonus_win),
        Ordering::Equal => (DRAW_POINTS + bonus_draw, DRAW_POINTS + bonus_draw)
    }
}

/// # Team mode
///
/// 1. Games between members of two different teams are grouped by round and
///     team pair. The first game of each group is the main match.
/// 2. Each team's round points are the sum of its game points. The higher sum
///     wins the round; equal sums are a drawn round worth half a round win.
/// 3. Team SOS and SOSOS are built over the round pairings the same way as the
///     individual ones.
fn team_round_standings(
    matches: &[Match],
    players: &[PlayerStanding],
    roster: &HashMap<PlayerId, TeamId>
) -> Vec<TeamStanding> {
    // (round, lower team id, higher team id) -> points of (lower, higher)
    let mut round_points: IndexMap<(u32, TeamId, TeamId), (f64, f64)> = IndexMap::new();

    for m in matches {
        let Some((a, b)) = m.pairing() else {
            continue;
        };
        let (Some(&team_a), Some(&team_b)) = (roster.get(&a), roster.get(&b)) else {
            continue;
        };
        if team_a == team_b {
            continue;
        }

        let key = (m.round.unwrap_or_default(), team_a.min(team_b), team_a.max(team_b));
        let main = !round_points.contains_key(&key);
        let (points_a, points_b) = game_points(m.score_a, m.score_b, main);

        let totals = round_points.entry(key).or_insert((0.0, 0.0));
        if team_a < team_b {
            totals.0 += points_a;
            totals.1 += points_b;
        } else {
            totals.0 += points_b;
            totals.1 += points_a;
        }
    }

    let mut round_wins: HashMap<TeamId, f64> = HashMap::new();
    let mut opponents: HashMap<TeamId, Vec<TeamId>> = HashMap::new();
    for ((_, low, high), (points_low, points_high)) in &round_points {
        let (won_low, won_high) = match points_low.total_cmp(points_high) {
            Ordering::Greater => (1.0, 0.0),
            Ordering::Less => (0.0, 1.0),
            Ordering::Equal => (0.5, 0.5)
        };
        *round_wins.entry(*low).or_default() += won_low;
        *round_wins.entry(*high).or_default() += won_high;
        opponents.entry(*low).or_default().push(*high);
        opponents.entry(*high).or_default().push(*low);
    }

    let wins_of = |team: &TeamId| round_wins.get(team).copied().unwrap_or_default();
    let sos: HashMap<TeamId, f64> = opponents
        .iter()
        .map(|(team, opps)| (*team, opps.iter().map(wins_of).sum::<f64>()))
        .collect();

    members_by_team(players, roster)
        .into_iter()
        .map(|(team_id, members)| {
            let team_opponents = opponents.get(&team_id).cloned().unwrap_or_default();

            TeamStanding {
                team_id,
                mode: TeamScoringMode::Team,
                score: wins_of(&team_id),
                sos: sos.get(&team_id).copied().unwrap_or_default(),
                sosos: team_opponents.iter().filter_map(|o| sos.get(o)).sum(),
                member_wins: members.iter().map(|m| m.wins).sum(),
                ranked: true,
                members,
                computed_position: None,
                saved_position: None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use approx::assert_abs_diff_eq;

    use crate::{
        model::records::{Match, PlayerId, TeamId},
        standings::{
            individual::{rank_players, PlayerStanding},
            swiss_stats::SwissStatsCalculator,
            team::{game_points, rank_teams, TeamScoringMode}
        },
        utils::test_utils::{generate_round_robin, generate_tournament_match}
    };

    fn individual(matches: &[Match]) -> Vec<PlayerStanding> {
        rank_players(&SwissStatsCalculator::calculate(matches), &HashMap::new(), false)
    }

    fn roster(teams: &[(TeamId, &[PlayerId])]) -> HashMap<PlayerId, TeamId> {
        teams
            .iter()
            .flat_map(|(team, members)| members.iter().map(move |p| (*p, *team)))
            .collect()
    }

    #[test]
    fn test_game_points() {
        assert_eq!(game_points(1, 0, true), (1.5, 0.0));
        assert_eq!(game_points(0, 1, false), (0.0, 1.0));
        assert_eq!(game_points(2, 2, true), (0.75, 0.75));
        assert_eq!(game_points(2, 2, false), (0.5, 0.5));
    }

    #[test]
    fn test_personal_award_mode() {
        // Positions 1 to 6 in id order
        let matches = generate_round_robin(1, &[1, 2, 3, 4, 5, 6]);
        let players = individual(&matches);
        let roster = roster(&[(10, &[1, 4]), (20, &[2, 3, 5]), (30, &[6])]);

        let standings = rank_teams(
            &matches,
            &players,
            &roster,
            TeamScoringMode::PersonalAward,
            &HashMap::new(),
            false
        );

        let order: Vec<_> = standings.iter().map(|s| (s.team_id, s.position())).collect();
        assert_eq!(order, vec![(20, Some(1)), (10, Some(2)), (30, None)]);

        // 1 + 4 plus a six player penalty for the missing third member
        assert_abs_diff_eq!(standings[1].score, 11.0);
        assert_abs_diff_eq!(standings[0].score, 10.0);
        assert!(!standings[2].ranked);
    }

    #[test]
    fn test_personal_award_counts_three_best() {
        let matches = generate_round_robin(1, &[1, 2, 3, 4, 5]);
        let players = individual(&matches);
        let roster = roster(&[(10, &[5, 1, 2, 3])]);

        let standings = rank_teams(
            &matches,
            &players,
            &roster,
            TeamScoringMode::PersonalAward,
            &HashMap::new(),
            false
        );

        let team = &standings[0];
        assert_abs_diff_eq!(team.score, 6.0);
        let counted: Vec<_> = team.members.iter().filter(|m| m.counted).map(|m| m.player_id).collect();
        assert_eq!(counted, vec![1, 2, 3]);
        assert_abs_diff_eq!(team.member_wins, 4.0 + 3.0 + 2.0 + 0.0);
    }

    #[test]
    fn test_team_mode_main_match_bonus() {
        let roster = roster(&[(1, &[1, 2]), (2, &[3, 4]), (3, &[5, 6])]);
        let matches = vec![
            // Round 1, team 1 wins on the main match bonus: 1.5 to 1
            generate_tournament_match(1, 1, 1, 1, 3, 1, 0),
            generate_tournament_match(2, 1, 1, 2, 4, 0, 1),
            // Round 2, team 2 wins the same way
            generate_tournament_match(3, 1, 2, 4, 1, 1, 0),
            generate_tournament_match(4, 1, 2, 2, 3, 1, 0),
            // Round 3, team 1 beats team 3
            generate_tournament_match(5, 1, 3, 1, 5, 1, 0),
            generate_tournament_match(6, 1, 3, 6, 2, 1, 0)
        ];
        let players = individual(&matches);

        let standings = rank_teams(&matches, &players, &roster, TeamScoringMode::Team, &HashMap::new(), false);
        let order: Vec<_> = standings.iter().map(|s| (s.team_id, s.position())).collect();
        assert_eq!(order, vec![(1, Some(1)), (2, Some(2)), (3, Some(3))]);

        let by_team: HashMap<_, _> = standings.iter().map(|s| (s.team_id, s)).collect();
        assert_abs_diff_eq!(by_team[&1].score, 2.0);
        assert_abs_diff_eq!(by_team[&2].score, 1.0);
        // Team 1 met team 2 twice and team 3 once
        assert_abs_diff_eq!(by_team[&1].sos, 2.0);
        assert_abs_diff_eq!(by_team[&2].sos, 4.0);
        assert_abs_diff_eq!(by_team[&3].sos, 2.0);
        assert_abs_diff_eq!(by_team[&1].sosos, 4.0 + 4.0 + 2.0);
        assert_abs_diff_eq!(by_team[&3].sosos, 2.0);
    }

    #[test]
    fn test_team_mode_drawn_round() {
        let roster = roster(&[(1, &[1, 2]), (2, &[3, 4])]);
        let matches = vec![
            generate_tournament_match(1, 1, 1, 1, 3, 1, 1),
            generate_tournament_match(2, 1, 1, 2, 4, 2, 2)
        ];
        let players = individual(&matches);

        let standings = rank_teams(&matches, &players, &roster, TeamScoringMode::Team, &HashMap::new(), false);

        assert!(standings.iter().all(|s| s.score == 0.5));
        // Fully tied teams share the position
        assert_eq!(standings[0].position(), Some(1));
        assert_eq!(standings[1].position(), Some(1));
    }

    #[test]
    fn test_team_saved_position_kept() {
        let roster = roster(&[(1, &[1]), (2, &[2])]);
        let matches = vec![generate_tournament_match(1, 1, 1, 1, 2, 1, 0)];
        let players = individual(&matches);
        let saved = HashMap::from([(2, 1)]);

        let standings = rank_teams(&matches, &players, &roster, TeamScoringMode::Team, &saved, false);

        assert_eq!(standings[0].team_id, 1);
        assert_eq!(standings[1].team_id, 2);
        assert_eq!(standings[1].position(), Some(1));
        assert_eq!(standings[1].computed_position, Some(2));
    }
}
