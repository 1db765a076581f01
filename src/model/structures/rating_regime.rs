use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::model::constants::{LONG_WINDOW_DECAY, LONG_WINDOW_GAMES, SHORT_WINDOW_GAMES, SHORT_WINDOW_MULTIPLIER};

/// How fast a player's rating is allowed to move.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum RatingRegime {
    /// Normal K-factor from the formula
    Established,
    /// Performance estimation over the first 12 rated games, K decaying from 3x to 1x
    LongWindow,
    /// Flat 2x K over the first 6 rated games
    ShortWindow
}

impl RatingRegime {
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, RatingRegime::Established)
    }

    /// Number of rated games the window lasts, if any.
    pub fn window_games(&self) -> Option<u32> {
        match self {
            RatingRegime::Established => None,
            RatingRegime::LongWindow => Some(LONG_WINDOW_GAMES),
            RatingRegime::ShortWindow => Some(SHORT_WINDOW_GAMES)
        }
    }

    /// Multiplier applied to the player's own K after `games_played` rated games
    /// inside the window.
    pub fn k_multiplier(&self, games_played: u32) -> f64 {
        match self {
            RatingRegime::Established => 1.0,
            RatingRegime::LongWindow => {
                let remaining = LONG_WINDOW_GAMES as f64 - games_played as f64;
                1.0 + (remaining / LONG_WINDOW_DECAY).max(0.0)
            }
            RatingRegime::ShortWindow => {
                if games_played < SHORT_WINDOW_GAMES {
                    SHORT_WINDOW_MULTIPLIER
                } else {
                    1.0
                }
            }
        }
    }
}
