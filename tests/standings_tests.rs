mod common;

use std::collections::HashMap;

use approx::assert_abs_diff_eq;
use chrono::Duration;
use league_rating::{
    model::{
        formula::{FormulaConfig, FormulaPreset},
        rating_engine::{EngineConfig, RatingEngine},
        records::{Match, PlayerId, TeamId}
    },
    standings::{
        enrichment::with_ratings,
        individual::{rank_players, PlayerStanding},
        swiss_stats::SwissStatsCalculator,
        team::{rank_teams, TeamScoringMode}
    },
    utils::test_utils::{generate_established, generate_match, generate_round_robin, generate_tournament_match, timestamp}
};

fn individual(matches: &[Match], tournament_id: i32) -> Vec<PlayerStanding> {
    rank_players(
        &SwissStatsCalculator::calculate_tournament(matches, tournament_id),
        &HashMap::new(),
        false
    )
}

fn roster(teams: &[(TeamId, &[PlayerId])]) -> HashMap<PlayerId, TeamId> {
    teams
        .iter()
        .flat_map(|(team, members)| members.iter().map(move |p| (*p, *team)))
        .collect()
}

#[test]
fn test_round_robin_standings() {
    common::init_test_env();

    let matches = generate_round_robin(1, &[1, 2, 3, 4, 5, 6]);
    let standings = individual(&matches, 1);

    let order: Vec<_> = standings.iter().map(|s| (s.player_id, s.position())).collect();
    assert_eq!(
        order,
        vec![(1, Some(1)), (2, Some(2)), (3, Some(3)), (4, Some(4)), (5, Some(5)), (6, Some(6))]
    );

    // Opponents of the winner won 4 + 3 + 2 + 1 + 0 games
    assert_abs_diff_eq!(standings[0].sos, 10.0);
    assert_abs_diff_eq!(standings[5].sos, 15.0);
    assert!(standings[0].undefeated);
}

#[test]
fn test_standings_only_count_their_tournament() {
    common::init_test_env();

    let mut matches = generate_round_robin(1, &[1, 2, 3]);
    let mut other = generate_round_robin(2, &[1, 4, 5, 6]);
    for m in other.iter_mut() {
        m.id += 100;
    }
    matches.extend(other);

    let standings = individual(&matches, 1);
    assert_eq!(standings.len(), 3);
    assert_abs_diff_eq!(standings[0].stats.wins, 2.0);
}

#[test]
fn test_standings_with_ratings_from_engine() {
    common::init_test_env();

    let mut matches = generate_round_robin(3, &[1, 2, 3, 4]);
    matches.push(generate_match(100, 1, 2, 0));

    let tournament_start = matches.iter().filter(|m| m.tournament_id == Some(3)).map(|m| m.timestamp).min().unwrap();
    let tournament_end = matches.iter().filter(|m| m.tournament_id == Some(3)).map(|m| m.timestamp).max().unwrap();
    assert_eq!(tournament_start, timestamp(1));

    let engine = RatingEngine::new(EngineConfig::new(FormulaConfig::preset(FormulaPreset::Standard))).unwrap();
    let runs = engine
        .run_at_cutoffs(
            &matches,
            &generate_established(&[1, 2, 3, 4], 1700.0),
            &[tournament_start - Duration::seconds(1), tournament_end]
        )
        .unwrap();

    let standings = with_ratings(individual(&matches, 3), &runs[0], &runs[1]);
    let by_player: HashMap<PlayerId, &PlayerStanding> = standings.iter().map(|s| (s.player_id, s)).collect();

    assert_abs_diff_eq!(by_player[&1].rating_before.unwrap(), 1708.0);
    assert_abs_diff_eq!(by_player[&2].rating_before.unwrap(), 1692.0);
    assert_eq!(by_player[&3].rating_before, None);

    assert!(by_player[&1].rating_after.unwrap() > 1708.0);
    assert!(by_player[&4].rating_after.unwrap() < 1700.0);
}

#[test]
fn test_personal_award_teams() {
    common::init_test_env();

    let matches = generate_round_robin(1, &[1, 2, 3, 4, 5, 6]);
    let players = individual(&matches, 1);
    let roster = roster(&[(10, &[1, 4, 5]), (20, &[2, 3, 6]), (30, &[7])]);

    let teams = rank_teams(
        &matches,
        &players,
        &roster,
        TeamScoringMode::PersonalAward,
        &HashMap::new(),
        false
    );

    let order: Vec<_> = teams.iter().map(|t| (t.team_id, t.position())).collect();
    assert_eq!(order, vec![(10, Some(1)), (20, Some(2)), (30, None)]);
    assert_abs_diff_eq!(teams[0].score, 10.0);
    assert_abs_diff_eq!(teams[1].score, 11.0);
    assert!(!teams[2].ranked);
}

#[test]
fn test_team_rounds_with_main_match() {
    common::init_test_env();

    // The main match win outweighs the second board loss
    let matches = vec![
        generate_tournament_match(1, 1, 1, 1, 3, 1, 0),
        generate_tournament_match(2, 1, 1, 2, 4, 0, 1)
    ];
    let players = individual(&matches, 1);
    let roster = roster(&[(10, &[1, 2]), (20, &[3, 4])]);

    let teams = rank_teams(&matches, &players, &roster, TeamScoringMode::Team, &HashMap::new(), false);

    let order: Vec<_> = teams.iter().map(|t| (t.team_id, t.position(), t.score)).collect();
    assert_eq!(order, vec![(10, Some(1), 1.0), (20, Some(2), 0.0)]);
    assert_abs_diff_eq!(teams[0].sos, 0.0);
    assert_abs_diff_eq!(teams[1].sos, 1.0);
}

#[test]
fn test_team_mode_names() {
    common::init_test_env();

    assert_eq!("personal".parse::<TeamScoringMode>().unwrap(), TeamScoringMode::PersonalAward);
    assert_eq!("team".parse::<TeamScoringMode>().unwrap(), TeamScoringMode::Team);
    assert!("league".parse::<TeamScoringMode>().is_err());
    assert_eq!(
        serde_json::to_value(TeamScoringMode::PersonalAward).unwrap(),
        serde_json::json!("personalAward")
    );
}
