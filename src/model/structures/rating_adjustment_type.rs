use serde_repr::{Deserialize_repr, Serialize_repr};
use std::convert::TryFrom;

#[derive(Deserialize_repr, Serialize_repr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RatingAdjustmentType {
    Initial = 0,
    Match = 1,
    /// Correction applied when a long estimation window closes
    Estimation = 2,
    /// Rating raised to a promotion floor
    Promotion = 3
}

impl TryFrom<i32> for RatingAdjustmentType {
    type Error = ();

    fn try_from(v: i32) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(RatingAdjustmentType::Initial),
            1 => Ok(RatingAdjustmentType::Match),
            2 => Ok(RatingAdjustmentType::Estimation),
            3 => Ok(RatingAdjustmentType::Promotion),
            _ => Err(())
        }
    }
}
