use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::EngineError,
    model::constants::{DAN_ONE_RATING, DAN_STEP, KYU_ONE_RATING, KYU_STEP, PRO_ONE_RATING, PRO_STEP}
};

/// A playing rank as supplied by a ranking organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Rank {
    Kyu(u8),
    Dan(u8),
    Pro(u8)
}

impl Rank {
    pub fn is_pro(&self) -> bool {
        matches!(self, Rank::Pro(_))
    }

    pub fn is_kyu(&self) -> bool {
        matches!(self, Rank::Kyu(_))
    }
}

impl FromStr for Rank {
    type Err = EngineError;

    /// Accepts `"5k"`, `"1d"`, `"3p"`, `"2 dan"`, `"10 kyu"` and so on.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let split = normalized
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| EngineError::InvalidRank(s.to_string()))?;
        let (number, suffix) = normalized.split_at(split);

        let value: u8 = number.parse().map_err(|_| EngineError::InvalidRank(s.to_string()))?;
        if value == 0 {
            return Err(EngineError::InvalidRank(s.to_string()));
        }

        match suffix.trim() {
            "k" | "kyu" => Ok(Rank::Kyu(value)),
            "d" | "dan" => Ok(Rank::Dan(value)),
            "p" | "pro" => Ok(Rank::Pro(value)),
            _ => Err(EngineError::InvalidRank(s.to_string()))
        }
    }
}

impl TryFrom<String> for Rank {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rank> for String {
    fn from(rank: Rank) -> Self {
        rank.to_string()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Kyu(n) => write!(f, "{}k", n),
            Rank::Dan(n) => write!(f, "{}d", n),
            Rank::Pro(n) => write!(f, "{}p", n)
        }
    }
}

/// Maps ranks onto the rating scale of a league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankScale {
    /// Rating of 1 kyu; each further kyu subtracts `kyu_step`
    pub kyu_one: f64,
    pub kyu_step: f64,
    /// Rating of 1 dan; each further dan adds `dan_step`
    pub dan_one: f64,
    pub dan_step: f64,
    pub pro_one: f64,
    pub pro_step: f64
}

impl Default for RankScale {
    fn default() -> Self {
        RankScale {
            kyu_one: KYU_ONE_RATING,
            kyu_step: KYU_STEP,
            dan_one: DAN_ONE_RATING,
            dan_step: DAN_STEP,
            pro_one: PRO_ONE_RATING,
            pro_step: PRO_STEP
        }
    }
}

impl RankScale {
    pub fn rating(&self, rank: Rank) -> f64 {
        match rank {
            Rank::Kyu(n) => self.kyu_one - self.kyu_step * (n as f64 - 1.0),
            Rank::Dan(n) => self.dan_one + self.dan_step * (n as f64 - 1.0),
            Rank::Pro(n) => self.pro_one + self.pro_step * (n as f64 - 1.0)
        }
    }

    /// The rating distance between `rank` and its neighbour within the same class.
    pub fn single_rank_difference(&self, rank: Rank) -> f64 {
        match rank {
            Rank::Kyu(_) => self.kyu_step,
            Rank::Dan(_) => self.dan_step,
            Rank::Pro(_) => self.pro_step
        }
    }
}
