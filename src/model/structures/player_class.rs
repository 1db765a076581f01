use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::model::structures::rating_regime::RatingRegime;

/// Classification supplied by the player metadata source.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter)]
pub enum PlayerClass {
    /// Rank held with a recognized organization and a known history
    Established,
    /// No usable rank information
    #[default]
    Unknown,
    ForeignDan,
    /// Foreign or unrecognized kyu rank
    ForeignKyu,
    /// First local dan rank
    NewLocalDan,
    /// First local kyu rank
    NewLocalKyu,
    /// Flagged by the metadata source as back after a long break
    Returning
}

impl PlayerClass {
    pub fn initial_regime(&self) -> RatingRegime {
        match self {
            PlayerClass::Established => RatingRegime::Established,
            PlayerClass::NewLocalDan | PlayerClass::Returning => RatingRegime::ShortWindow,
            PlayerClass::Unknown | PlayerClass::ForeignDan | PlayerClass::ForeignKyu | PlayerClass::NewLocalKyu => {
                RatingRegime::LongWindow
            }
        }
    }

    /// Local kyu players stop estimating as soon as a promotion validates them.
    pub fn promotion_stops_estimation(&self) -> bool {
        matches!(self, PlayerClass::NewLocalKyu)
    }
}
