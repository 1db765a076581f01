use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::model::{
    constants::PROMOTION_HALF_STEP,
    records::{MatchId, PlayerId},
    structures::rank::{Rank, RankScale}
};

/// A rank promotion reported by an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionEvent {
    pub effective_date: DateTime<FixedOffset>,
    pub organization: String,
    #[serde(default)]
    pub old_rank: Option<Rank>,
    pub new_rank: Rank,
    /// Filled in once the event is consumed during replay
    #[serde(default)]
    pub rating_floor: Option<f64>
}

impl PromotionEvent {
    /// Two events describe the same promotion regardless of consumption state.
    pub fn same_promotion(&self, other: &PromotionEvent) -> bool {
        self.effective_date == other.effective_date
            && self.organization == other.organization
            && self.old_rank == other.old_rank
            && self.new_rank == other.new_rank
    }
}

/// A promotion that raised a player's rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionBonus {
    pub player_id: PlayerId,
    pub match_id: Option<MatchId>,
    pub event: PromotionEvent,
    pub rating_before: f64,
    pub bonus_amount: f64
}

/// How promotions translate into rating floors for one league.
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionPolicy {
    pub rank_scale: RankScale,
    /// New ranks rated at or above this earn no bonus
    pub ceiling: f64,
    /// Organizations whose promotions use the half-step reduction. Empty means
    /// every organization is treated as local.
    pub local_organizations: Vec<String>
}

impl PromotionPolicy {
    pub fn is_foreign(&self, organization: &str) -> bool {
        !self.local_organizations.is_empty()
            && !self
                .local_organizations
                .iter()
                .any(|o| o.eq_ignore_ascii_case(organization))
    }

    /// The rating floor granted by `event`, or `None` when the new rank is at or
    /// above the bonus ceiling.
    pub fn floor_for(&self, event: &PromotionEvent, pro: bool) -> Option<f64> {
        let new_rank_rating = self.rank_scale.rating(event.new_rank);
        if new_rank_rating >= self.ceiling {
            return None;
        }

        let full_step = pro || event.new_rank.is_pro() || self.is_foreign(&event.organization);
        Some(rating_floor(
            new_rank_rating,
            self.rank_scale.single_rank_difference(event.new_rank),
            full_step
        ))
    }
}

/// `new_rank_rating - single_rank_difference * 0.5`, or the full rank rating for
/// pro players and foreign promotions.
pub fn rating_floor(new_rank_rating: f64, single_rank_difference: f64, full_step: bool) -> f64 {
    if full_step {
        new_rank_rating
    } else {
        new_rank_rating - single_rank_difference * PROMOTION_HALF_STEP
    }
}

/// Pending and consumed promotions of one player. An event is consumed at most
/// once, and a promotion already seen is never queued again.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionLedger {
    pending: Vec<PromotionEvent>,
    consumed: Vec<PromotionEvent>
}

impl PromotionLedger {
    pub fn new(events: &[PromotionEvent]) -> PromotionLedger {
        let mut ledger = PromotionLedger::default();
        for event in events {
            ledger.add_pending(event.clone());
        }

        ledger
    }

    /// Queues `event` unless the same promotion is already pending or consumed.
    pub fn add_pending(&mut self, event: PromotionEvent) -> bool {
        let known = self
            .pending
            .iter()
            .chain(self.consumed.iter())
            .any(|e| e.same_promotion(&event));
        if known {
            return false;
        }

        // Keep pending events in date order; equal dates keep insertion order
        let idx = self.pending.partition_point(|e| e.effective_date <= event.effective_date);
        self.pending.insert(idx, event);
        true
    }

    /// Removes and returns every pending event effective at or before `at`.
    pub fn take_due(&mut self, at: DateTime<FixedOffset>) -> Vec<PromotionEvent> {
        let due = self.pending.partition_point(|e| e.effective_date <= at);
        self.pending.drain(..due).collect()
    }

    pub fn record_consumed(&mut self, event: PromotionEvent) {
        self.consumed.push(event);
    }

    pub fn pending(&self) -> &[PromotionEvent] {
        &self.pending
    }

    pub fn consumed(&self) -> &[PromotionEvent] {
        &self.consumed
    }
}
