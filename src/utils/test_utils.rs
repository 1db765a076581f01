use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use itertools::Itertools;
use rand::{seq::IndexedRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::model::{
    promotion::PromotionEvent,
    records::{Match, MatchId, PlayerId, PlayerMetadata, TournamentId},
    structures::{player_class::PlayerClass, rank::Rank}
};

/// Midnight UTC on 2024-01-01 plus `day` days.
pub fn timestamp(day: i64) -> DateTime<FixedOffset> {
    timestamp_at(day, 0)
}

pub fn timestamp_at(day: i64, hour: i64) -> DateTime<FixedOffset> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().fixed_offset();
    base + Duration::days(day) + Duration::hours(hour)
}

/// A rated game won 1:0 by `player_a`.
pub fn generate_match(id: MatchId, player_a: PlayerId, player_b: PlayerId, day: i64) -> Match {
    Match {
        id,
        player_a: Some(player_a),
        player_b: Some(player_b),
        timestamp: timestamp(day),
        score_a: 1,
        score_b: 0,
        factor: 1.0,
        tournament_id: None,
        round: None,
        name: "Test Match".to_string()
    }
}

/// An unrated bye for `player`.
pub fn generate_bye(id: MatchId, player: PlayerId, score: i32, day: i64) -> Match {
    Match {
        id,
        player_a: Some(player),
        player_b: None,
        timestamp: timestamp(day),
        score_a: score,
        score_b: 0,
        factor: 0.0,
        tournament_id: None,
        round: None,
        name: "Test Match".to_string()
    }
}

pub fn generate_tournament_match(
    id: MatchId,
    tournament_id: TournamentId,
    round: u32,
    player_a: PlayerId,
    player_b: PlayerId,
    score_a: i32,
    score_b: i32
) -> Match {
    let mut m = generate_match(id, player_a, player_b, round as i64);
    m.tournament_id = Some(tournament_id);
    m.round = Some(round);
    m.score_a = score_a;
    m.score_b = score_b;
    m
}

/// Single round-robin where every player beats everyone listed after them.
/// Each game is played in its own round.
pub fn generate_round_robin(tournament_id: TournamentId, player_ids: &[PlayerId]) -> Vec<Match> {
    player_ids
        .iter()
        .tuple_combinations()
        .enumerate()
        .map(|(i, (a, b))| generate_tournament_match(i as MatchId + 1, tournament_id, i as u32 + 1, *a, *b, 1, 0))
        .collect()
}

pub fn generate_promotion(effective_date: DateTime<FixedOffset>, organization: &str, new_rank: Rank) -> PromotionEvent {
    PromotionEvent {
        effective_date,
        organization: organization.to_string(),
        old_rank: None,
        new_rank,
        rating_floor: None
    }
}

pub fn generate_metadata(player_id: PlayerId, class: PlayerClass, initial_rating: Option<f64>) -> PlayerMetadata {
    PlayerMetadata {
        player_id,
        class,
        initial_rating,
        ..Default::default()
    }
}

/// Established metadata for every id, all starting at `rating`.
pub fn generate_established(player_ids: &[PlayerId], rating: f64) -> Vec<PlayerMetadata> {
    player_ids
        .iter()
        .map(|id| generate_metadata(*id, PlayerClass::Established, Some(rating)))
        .collect()
}

/// A reproducible random history of `n` games between the given players, one
/// game per hour starting at `timestamp(0)`. Roughly one game in ten is drawn.
pub fn generate_matches(n: i32, player_ids: &[PlayerId], seed: u64) -> Vec<Match> {
    if player_ids.len() < 2 {
        panic!("At least two players are needed to generate matches");
    }

    // Initialize seeded RNG for reproducible results
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut matches = Vec::with_capacity(n as usize);

    for i in 0..n {
        let pair: Vec<PlayerId> = player_ids.choose_multiple(&mut rng, 2).copied().collect();
        let (score_a, score_b) = match rng.random_range(0..10) {
            0 => (1, 1),
            1..=4 => (0, 1),
            _ => (1, 0)
        };

        matches.push(Match {
            id: i + 1,
            player_a: Some(pair[0]),
            player_b: Some(pair[1]),
            timestamp: timestamp_at(0, i as i64),
            score_a,
            score_b,
            factor: 1.0,
            tournament_id: None,
            round: None,
            name: "Test Match".to_string()
        });
    }

    matches
}
