use std::collections::VecDeque;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::model::{
    estimation::{estimate_rating, estimation_correction, Observation},
    formula::FormulaConfig,
    promotion::{PromotionBonus, PromotionLedger, PromotionPolicy},
    records::{MatchId, PlayerId, PlayerMetadata},
    structures::{player_class::PlayerClass, rating_regime::RatingRegime}
};

/// Replay scratch state of one player. Built fresh for every engine run and
/// discarded with its result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRatingState {
    pub player_id: PlayerId,
    pub rating: f64,
    /// Rating the player entered the replay with
    pub initial_rating: f64,
    pub class: PlayerClass,
    pub pro: bool,
    pub regime: RatingRegime,
    /// Every match touching the player, rated or not
    pub total_matches: u32,
    pub rated_games: u32,
    /// Rated games inside the current window; after a return this is the
    /// number of matches since the return
    pub window_games: u32,
    pub first_match: Option<DateTime<FixedOffset>>,
    pub last_match: Option<DateTime<FixedOffset>>,
    pub previous_match: Option<DateTime<FixedOffset>>,
    /// The starting rating is a guess to be corrected by performance estimation
    pub estimated_initial: bool,
    /// Excluded from primary leaderboards while estimation is running
    pub hidden: bool,
    observations: VecDeque<Observation>,
    promotions: PromotionLedger
}

impl PlayerRatingState {
    pub fn new(metadata: &PlayerMetadata, formula: &FormulaConfig) -> PlayerRatingState {
        let initial_rating = metadata
            .initial_rating
            .or_else(|| metadata.rank.map(|r| formula.rank_scale.rating(r)))
            .unwrap_or(formula.default_rating)
            .max(formula.min_rating);
        let regime = metadata.class.initial_regime();
        let long_window = regime == RatingRegime::LongWindow;

        PlayerRatingState {
            player_id: metadata.player_id,
            rating: initial_rating,
            initial_rating,
            class: metadata.class,
            pro: metadata.pro,
            regime,
            total_matches: 0,
            rated_games: 0,
            window_games: 0,
            first_match: None,
            last_match: None,
            previous_match: None,
            estimated_initial: long_window,
            hidden: long_window,
            observations: VecDeque::new(),
            promotions: PromotionLedger::new(&metadata.promotions)
        }
    }

    pub fn observations(&self) -> &VecDeque<Observation> {
        &self.observations
    }

    pub fn promotions(&self) -> &PromotionLedger {
        &self.promotions
    }

    /// Multiplier on the player's own K for the next rated game.
    pub fn k_multiplier(&self) -> f64 {
        self.regime.k_multiplier(self.window_games)
    }

    /// Activity bookkeeping for any match the player shows up in.
    pub fn record_presence(&mut self, at: DateTime<FixedOffset>) {
        self.previous_match = self.last_match;
        self.last_match = Some(at);
        self.first_match.get_or_insert(at);
        self.total_matches += 1;
    }

    /// Starts a short window after a long absence. An open long window keeps
    /// running since it already rates the player more aggressively.
    pub fn enter_return_window(&mut self) -> bool {
        if self.regime == RatingRegime::LongWindow {
            return false;
        }

        self.regime = RatingRegime::ShortWindow;
        self.window_games = 0;
        true
    }

    pub fn record_rated_game(&mut self, opponent_rating: f64, score: f64) {
        self.rated_games += 1;
        if self.regime.is_dynamic() {
            self.window_games += 1;
        }
        if self.regime == RatingRegime::LongWindow {
            self.observations.push_back(Observation::new(opponent_rating, score));
        }
    }

    pub fn window_complete(&self) -> bool {
        match self.regime.window_games() {
            Some(n) => self.window_games >= n,
            None => false
        }
    }

    /// Closes the current window. A long window also corrects the rating
    /// towards the performance estimate; the applied correction is returned.
    pub fn close_window(&mut self, min_rating: f64) -> Option<f64> {
        let correction = match self.regime {
            RatingRegime::LongWindow => {
                let observations: Vec<Observation> = self.observations.iter().copied().collect();
                estimate_rating(&observations).map(|estimated| {
                    let before = self.rating;
                    self.rating = (self.rating + estimation_correction(estimated, self.initial_rating)).max(min_rating);
                    self.rating - before
                })
            }
            _ => None
        };

        self.end_window();
        correction
    }

    /// Ends the window without any estimation correction.
    pub fn stop_estimation(&mut self) {
        self.end_window();
    }

    fn end_window(&mut self) {
        self.regime = RatingRegime::Established;
        self.window_games = 0;
        self.hidden = false;
        self.observations.clear();
    }

    /// # Promotion bonus
    ///
    /// Consumes every pending promotion effective at or before `at`. When an
    /// eligible promotion's floor is above the current rating, the rating is
    /// raised to the floor. A local kyu player still estimating stops the
    /// window at the first promotion instead of waiting for the game count.
    pub fn apply_promotions(
        &mut self,
        at: DateTime<FixedOffset>,
        match_id: Option<MatchId>,
        policy: &PromotionPolicy
    ) -> Vec<PromotionBonus> {
        let mut bonuses = Vec::new();

        for mut event in self.promotions.take_due(at) {
            let floor = policy.floor_for(&event, self.pro);
            event.rating_floor = floor;

            if let Some(floor) = floor.filter(|f| *f > self.rating) {
                bonuses.push(PromotionBonus {
                    player_id: self.player_id,
                    match_id,
                    event: event.clone(),
                    rating_before: self.rating,
                    bonus_amount: floor - self.rating
                });
                self.rating = floor;
            }

            if self.regime == RatingRegime::LongWindow && self.class.promotion_stops_estimation() {
                self.stop_estimation();
            }

            self.promotions.record_consumed(event);
        }

        bonuses
    }
}
