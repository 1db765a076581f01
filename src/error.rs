use thiserror::Error;

use crate::model::records::MatchId;

/// Errors raised at the engine boundary. Every variant is detected before
/// replay starts; the replay itself never fails part-way through.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("Match {match_id} has a negative score")]
    NegativeScore { match_id: MatchId },

    #[error("Match {match_id} appears more than once")]
    DuplicateMatch { match_id: MatchId },

    #[error("Match {match_id} has an invalid factor (must be finite and non-negative)")]
    InvalidFactor { match_id: MatchId },

    #[error("Match {match_id} pairs a player against themselves")]
    SelfPairing { match_id: MatchId },

    #[error("Match {match_id} has no players")]
    EmptyMatch { match_id: MatchId },

    #[error("Invalid rank: {0}")]
    InvalidRank(String),

    #[error("Invalid formula configuration: {0}")]
    InvalidConfig(String),

    #[error("Replay window starts after its cutoff")]
    InvalidWindow
}
