use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use clap::Parser;

use league_rating::{
    model::{constants::INACTIVITY_GAP_DAYS, formula::FormulaPreset, records::TournamentId},
    standings::team::TeamScoringMode
};

#[derive(Parser, Clone, Debug)]
#[command(
    display_name = "League Rating",
    long_about = "Replays a match history into Elo ratings and, optionally, Swiss standings for one tournament"
)]
pub struct Args {
    /// JSON array of match records
    #[arg(short, long, env = "MATCHES_PATH", help = "Path to the match history (JSON)")]
    pub matches: PathBuf,

    /// JSON array of player metadata. Players without metadata are rated as unknown.
    #[arg(short, long, env = "PLAYERS_PATH", help = "Path to the player metadata (JSON)")]
    pub players: Option<PathBuf>,

    #[arg(long, env = "RATING_PRESET", default_value = "standard", help = "Named formula variant")]
    pub preset: FormulaPreset,

    /// A full formula configuration. Takes precedence over --preset.
    #[arg(long, env = "RATING_FORMULA", help = "Path to a formula configuration (JSON)")]
    pub formula: Option<PathBuf>,

    #[arg(long, help = "Ignore matches before this time (RFC 3339)")]
    pub start: Option<DateTime<FixedOffset>>,

    #[arg(long, help = "Ignore matches after this time (RFC 3339)")]
    pub cutoff: Option<DateTime<FixedOffset>>,

    #[arg(long, env = "SUBSET_FILTER", help = "Only replay matches whose name contains this text")]
    pub subset: Option<String>,

    #[arg(
        long,
        env = "LOCAL_ORGANIZATIONS",
        value_delimiter = ',',
        help = "Organizations whose promotions use the half-step floor"
    )]
    pub local_organizations: Vec<String>,

    #[arg(long, default_value_t = INACTIVITY_GAP_DAYS, help = "Days without a match before a player counts as returning")]
    pub inactivity_gap_days: i64,

    #[arg(long, action = clap::ArgAction::SetTrue, help = "Leave players without a rated match out of the leaderboard")]
    pub active_only: bool,

    #[arg(short, long, help = "Emit standings for this tournament")]
    pub tournament: Option<TournamentId>,

    #[arg(long, default_value = "personal", help = "Team scoring mode (personal, team)")]
    pub team_mode: TeamScoringMode,

    /// JSON object mapping player id to team id
    #[arg(long, help = "Path to the team roster (JSON)")]
    pub roster: Option<PathBuf>,

    #[arg(long, action = clap::ArgAction::SetTrue, help = "Show a progress bar while replaying")]
    pub progress: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        env = "RUST_LOG",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        help = "Sets the logging verbosity"
    )]
    pub log_level: String
}
