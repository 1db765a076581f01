mod args;

use std::{collections::HashMap, fs, path::Path, process::ExitCode};

use chrono::{DateTime, Duration, FixedOffset};
use clap::Parser;
use dotenv::dotenv;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{error, info};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use args::Args;
use league_rating::{
    model::{
        data_processing::ReplayWindow,
        formula::FormulaConfig,
        promotion::PromotionBonus,
        rating_engine::{EngineConfig, RatingEngine},
        rating_tracker::LeaderboardEntry,
        records::{Match, MatchRatingChange, PlayerId, PlayerMetadata, TeamId, TournamentId}
    },
    standings::{
        enrichment::with_ratings,
        individual::{rank_players, PlayerStanding},
        swiss_stats::SwissStatsCalculator,
        team::{rank_teams, TeamStanding}
    },
    EngineError
};

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse { path: String, source: serde_json::Error },
    #[error("failed to write report: {0}")]
    Write(#[from] serde_json::Error),
    #[error(transparent)]
    Engine(#[from] EngineError)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    formula: String,
    cutoff: Option<DateTime<FixedOffset>>,
    leaderboard: Vec<LeaderboardEntry>,
    hidden: Vec<PlayerId>,
    match_changes: Vec<MatchRatingChange>,
    promotion_bonuses: Vec<PromotionBonus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    standings: Option<TournamentReport>
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TournamentReport {
    tournament_id: TournamentId,
    players: Vec<PlayerStanding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    teams: Option<Vec<TeamStanding>>
}

fn main() -> ExitCode {
    dotenv().ok();
    let args = Args::parse();
    init_logging(&args.log_level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .init();
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let display = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: display.clone(),
        source
    })?;

    serde_json::from_str(&contents).map_err(|source| CliError::Parse { path: display, source })
}

fn engine_config(args: &Args) -> Result<EngineConfig, CliError> {
    let formula = match &args.formula {
        Some(path) => read_json::<FormulaConfig>(path)?,
        None => FormulaConfig::preset(args.preset)
    };

    Ok(EngineConfig {
        formula,
        window: ReplayWindow {
            start: args.start,
            cutoff: args.cutoff
        },
        subset_filter: args.subset.clone(),
        local_organizations: args.local_organizations.clone(),
        inactivity_gap_days: args.inactivity_gap_days,
        show_progress: args.progress
    })
}

fn run(args: &Args) -> Result<(), CliError> {
    let matches: Vec<Match> = read_json(&args.matches)?;
    let metadata: Vec<PlayerMetadata> = match &args.players {
        Some(path) => read_json(path)?,
        None => Vec::new()
    };

    let engine = RatingEngine::new(engine_config(args)?)?;
    info!(matches = matches.len(), players = metadata.len(), "Loaded input");

    let result = engine.run(&matches, &metadata)?;
    let standings = match args.tournament {
        Some(tournament_id) => Some(tournament_report(args, &engine, &matches, &metadata, tournament_id)?),
        None => None
    };

    let report = Report {
        formula: engine.config().formula.name.clone(),
        cutoff: result.cutoff,
        leaderboard: result.leaderboard(args.active_only),
        hidden: result.hidden.iter().copied().collect(),
        match_changes: result.match_changes,
        promotion_bonuses: result.promotion_bonuses,
        standings
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Standings of one tournament, with ratings as of just before its first
/// match and after its last one.
fn tournament_report(
    args: &Args,
    engine: &RatingEngine,
    matches: &[Match],
    metadata: &[PlayerMetadata],
    tournament_id: TournamentId
) -> Result<TournamentReport, CliError> {
    let tournament_matches: Vec<Match> = matches
        .iter()
        .filter(|m| m.tournament_id == Some(tournament_id))
        .cloned()
        .collect();
    let table = SwissStatsCalculator::calculate(&tournament_matches);
    let mut players = rank_players(&table, &HashMap::new(), false);

    let timestamps = tournament_matches.iter().map(|m| m.timestamp);
    if let (Some(first), Some(last)) = (timestamps.clone().min(), timestamps.max()) {
        let runs = engine.run_at_cutoffs(matches, metadata, &[first - Duration::seconds(1), last])?;
        if let [before, after] = runs.as_slice() {
            players = with_ratings(players, before, after);
        }
    }

    let teams = match &args.roster {
        Some(path) => {
            let roster: HashMap<PlayerId, TeamId> = read_json(path)?;
            Some(rank_teams(&tournament_matches, &players, &roster, args.team_mode, &HashMap::new(), false))
        }
        None => None
    };

    info!(
        tournament_id,
        players = players.len(),
        teams = teams.as_ref().map_or(0, |t| t.len()),
        "Computed standings"
    );

    Ok(TournamentReport {
        tournament_id,
        players,
        teams
    })
}
