use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, FixedOffset};
use indexmap::{map::Entry, IndexMap};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::{
    error::EngineError,
    model::{
        constants::{INACTIVITY_GAP_DAYS, OPPONENT_PROTECTION_MULTIPLIER},
        data_processing::{prepare_matches, validate_matches, ReplayWindow},
        formula::{EloFormula, FormulaConfig, RatingFormula},
        inactivity::is_returning,
        player_state::PlayerRatingState,
        promotion::{PromotionBonus, PromotionPolicy},
        rating_tracker::RatingTracker,
        records::{Match, MatchRatingChange, PlayerId, PlayerMetadata},
        structures::{elo_stat::EloStat, rating_adjustment_type::RatingAdjustmentType, rating_regime::RatingRegime}
    },
    utils::progress_utils::progress_bar
};

fn default_inactivity_gap() -> i64 {
    INACTIVITY_GAP_DAYS
}

/// Per-league settings of one engine. Nothing here is process-wide; two
/// engines with different configs can run side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub formula: FormulaConfig,
    #[serde(default)]
    pub window: ReplayWindow,
    /// Only matches whose name contains this (case-insensitive) are replayed
    #[serde(default)]
    pub subset_filter: Option<String>,
    /// Organizations whose promotions are local. Empty treats all as local.
    #[serde(default)]
    pub local_organizations: Vec<String>,
    #[serde(default = "default_inactivity_gap")]
    pub inactivity_gap_days: i64,
    #[serde(default)]
    pub show_progress: bool
}

impl EngineConfig {
    pub fn new(formula: FormulaConfig) -> EngineConfig {
        EngineConfig {
            formula,
            window: ReplayWindow::default(),
            subset_filter: None,
            local_organizations: Vec::new(),
            inactivity_gap_days: INACTIVITY_GAP_DAYS,
            show_progress: false
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.formula.validate()?;
        self.window.validate()?;

        if self.inactivity_gap_days <= 0 {
            return Err(EngineError::InvalidConfig(
                "inactivity gap must be at least one day".to_string()
            ));
        }

        Ok(())
    }

    pub fn promotion_policy(&self) -> PromotionPolicy {
        PromotionPolicy {
            rank_scale: self.formula.rank_scale.clone(),
            ceiling: self.formula.promotion_ceiling,
            local_organizations: self.local_organizations.clone()
        }
    }
}

/// Replays match histories into ratings. The engine holds configuration only;
/// every run builds its own player states and throws them away afterwards.
pub struct RatingEngine {
    config: EngineConfig,
    formula: Box<dyn RatingFormula>
}

impl RatingEngine {
    pub fn new(config: EngineConfig) -> Result<RatingEngine, EngineError> {
        let formula = EloFormula::new(config.formula.clone())?;
        RatingEngine::with_formula(config, Box::new(formula))
    }

    /// Uses `formula` for expected scores and K instead of the configured
    /// curve. Floors, rank scale and the default rating still come from `config`.
    pub fn with_formula(config: EngineConfig, formula: Box<dyn RatingFormula>) -> Result<RatingEngine, EngineError> {
        config.validate()?;
        Ok(RatingEngine { config, formula })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn formula(&self) -> &dyn RatingFormula {
        self.formula.as_ref()
    }

    pub fn run(&self, matches: &[Match], metadata: &[PlayerMetadata]) -> Result<EloStat, EngineError> {
        self.run_window(matches, metadata, self.config.window, self.config.show_progress)
    }

    /// One independent replay per cutoff, in parallel. The configured window
    /// start applies to every run. Results come back in cutoff order; a cutoff
    /// before the window start yields an empty result.
    pub fn run_at_cutoffs(
        &self,
        matches: &[Match],
        metadata: &[PlayerMetadata],
        cutoffs: &[DateTime<FixedOffset>]
    ) -> Result<Vec<EloStat>, EngineError> {
        validate_matches(matches)?;

        cutoffs
            .par_iter()
            .map(|cutoff| {
                if self.config.window.start.is_some_and(|start| *cutoff < start) {
                    debug!(cutoff = ?cutoff, "Cutoff precedes the window start, nothing to replay");
                    return Ok(Replay::new(self, metadata).finish(Some(*cutoff)));
                }

                let window = ReplayWindow {
                    start: self.config.window.start,
                    cutoff: Some(*cutoff)
                };
                self.run_window(matches, metadata, window, false)
            })
            .collect()
    }

    fn run_window(
        &self,
        matches: &[Match],
        metadata: &[PlayerMetadata],
        window: ReplayWindow,
        show_progress: bool
    ) -> Result<EloStat, EngineError> {
        let span = info_span!("replay", cutoff = ?window.cutoff);
        let _guard = span.enter();

        let prepared = prepare_matches(matches, &window, self.config.subset_filter.as_deref())?;

        info!(
            total = matches.len(),
            replayed = prepared.len(),
            cutoff = ?window.cutoff,
            formula = %self.config.formula.name,
            "Starting rating replay"
        );

        let mut replay = Replay::new(self, metadata);
        replay.process(&prepared, show_progress);
        let result = replay.finish(window.cutoff);

        info!(
            players = result.ratings.len(),
            active = result.active.len(),
            hidden = result.hidden.len(),
            "Rating replay finished"
        );

        Ok(result)
    }
}

/// Scratch state of a single run.
struct Replay<'a> {
    formula: &'a dyn RatingFormula,
    formula_config: &'a FormulaConfig,
    policy: PromotionPolicy,
    inactivity_gap_days: i64,
    metadata: HashMap<PlayerId, &'a PlayerMetadata>,
    players: IndexMap<PlayerId, PlayerRatingState>,
    tracker: RatingTracker,
    match_changes: Vec<MatchRatingChange>,
    promotion_bonuses: Vec<PromotionBonus>
}

impl<'a> Replay<'a> {
    fn new(engine: &'a RatingEngine, metadata: &'a [PlayerMetadata]) -> Replay<'a> {
        Replay {
            formula: engine.formula.as_ref(),
            formula_config: &engine.config.formula,
            policy: engine.config.promotion_policy(),
            inactivity_gap_days: engine.config.inactivity_gap_days,
            metadata: metadata.iter().map(|m| (m.player_id, m)).collect(),
            players: IndexMap::new(),
            tracker: RatingTracker::new(),
            match_changes: Vec::new(),
            promotion_bonuses: Vec::new()
        }
    }

    fn process(&mut self, matches: &[Match], show_progress: bool) {
        let bar = progress_bar(matches.len() as u64, "Replaying matches".to_string(), show_progress);

        for m in matches {
            self.process_match(m);

            if let Some(bar) = &bar {
                bar.inc(1);
            }
        }

        if let Some(bar) = bar {
            bar.finish();
        }
    }

    fn process_match(&mut self, m: &Match) {
        if let Some((a, b)) = m.pairing() {
            self.process_game(m, a, b);
        } else if let Some((player_id, own_score, _)) = m.bye() {
            // A bye only counts as presence when rated or scored
            if m.is_rated() || own_score > 0 {
                self.prepare_player(player_id, m);
                if let Some(state) = self.players.get_mut(&player_id) {
                    state.record_presence(m.timestamp);
                }
            }
        }
    }

    /// # Game processing
    ///
    /// 1. Create missing player states, start return windows and apply any
    ///     promotion that became effective. Both happen before rating.
    /// 2. Unrated games stop here after the activity bookkeeping.
    /// 3. Each side's effective K is computed independently from its own regime
    ///     and the opponent protection rule, then scaled by the match factor.
    /// 4. Both ratings are updated from the before ratings, then any window
    ///     that reached its game count is closed.
    fn process_game(&mut self, m: &Match, a: PlayerId, b: PlayerId) {
        self.prepare_player(a, m);
        self.prepare_player(b, m);

        let (Some(rating_a), Some(rating_b)) = (self.rating(a), self.rating(b)) else {
            return;
        };

        if !m.is_rated() {
            for id in [a, b] {
                if let Some(state) = self.players.get_mut(&id) {
                    state.record_presence(m.timestamp);
                }
            }
            self.match_changes.push(MatchRatingChange {
                match_id: m.id,
                player_a: a,
                player_b: b,
                rating_before_a: rating_a,
                rating_before_b: rating_b,
                shift_a: 0.0,
                shift_b: 0.0,
                k_a: 0.0,
                k_b: 0.0,
                rated: false
            });
            return;
        }

        let k_a = self.effective_k(a, b) * m.factor;
        let k_b = self.effective_k(b, a) * m.factor;
        let actual_a = m.actual_score_a();
        let (new_a, new_b) = self.formula.rate(rating_a, rating_b, actual_a, k_a, k_b);

        for (id, new_rating, opponent_rating, score) in
            [(a, new_a, rating_b, actual_a), (b, new_b, rating_a, 1.0 - actual_a)]
        {
            if let Some(state) = self.players.get_mut(&id) {
                state.rating = new_rating;
                state.record_presence(m.timestamp);
                state.record_rated_game(opponent_rating, score);
            }
            self.tracker
                .insert_or_update(id, new_rating, RatingAdjustmentType::Match, Some(m.id), m.timestamp);
        }

        self.match_changes.push(MatchRatingChange {
            match_id: m.id,
            player_a: a,
            player_b: b,
            rating_before_a: rating_a,
            rating_before_b: rating_b,
            shift_a: new_a - rating_a,
            shift_b: new_b - rating_b,
            k_a,
            k_b,
            rated: true
        });

        self.close_window_if_complete(a, m);
        self.close_window_if_complete(b, m);
    }

    fn rating(&self, player_id: PlayerId) -> Option<f64> {
        self.players.get(&player_id).map(|s| s.rating)
    }

    /// Base K at the player's rating times their regime multiplier. An
    /// established non-pro player facing a dynamic opponent has it halved.
    fn effective_k(&self, player_id: PlayerId, opponent_id: PlayerId) -> f64 {
        let (Some(player), Some(opponent)) = (self.players.get(&player_id), self.players.get(&opponent_id)) else {
            return 0.0;
        };

        let k = self.formula.k_factor(player.rating) * player.k_multiplier();
        if player.regime == RatingRegime::Established && !player.pro && opponent.regime.is_dynamic() {
            k * OPPONENT_PROTECTION_MULTIPLIER
        } else {
            k
        }
    }

    /// Creates the player's state on first sight, then handles a return from
    /// inactivity and any due promotions.
    fn prepare_player(&mut self, player_id: PlayerId, m: &Match) {
        let state = match self.players.entry(player_id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let unknown = PlayerMetadata::unknown(player_id);
                let metadata = self.metadata.get(&player_id).copied().unwrap_or(&unknown);
                let state = PlayerRatingState::new(metadata, self.formula_config);

                self.tracker.track_initial(player_id, state.rating, m.timestamp);
                entry.insert(state)
            }
        };

        if is_returning(state.last_match, m.timestamp, self.inactivity_gap_days) && state.enter_return_window() {
            debug!(player_id, last_match = ?state.last_match, "Player returned after inactivity, short window started");
        }

        for bonus in state.apply_promotions(m.timestamp, Some(m.id), &self.policy) {
            debug!(
                player_id,
                new_rank = %bonus.event.new_rank,
                bonus = bonus.bonus_amount,
                "Promotion raised rating to floor"
            );
            self.tracker.insert_or_update(
                player_id,
                bonus.rating_before + bonus.bonus_amount,
                RatingAdjustmentType::Promotion,
                Some(m.id),
                m.timestamp
            );
            self.promotion_bonuses.push(bonus);
        }
    }

    fn close_window_if_complete(&mut self, player_id: PlayerId, m: &Match) {
        let min_rating = self.formula.min_rating();
        let Some(state) = self.players.get_mut(&player_id) else {
            return;
        };
        if !state.window_complete() {
            return;
        }

        let regime = state.regime;
        match state.close_window(min_rating) {
            Some(correction) => {
                debug!(player_id, correction, rating = state.rating, "Estimation window closed");
                self.tracker.insert_or_update(
                    player_id,
                    state.rating,
                    RatingAdjustmentType::Estimation,
                    Some(m.id),
                    m.timestamp
                );
            }
            None => debug!(player_id, ?regime, "Rating window closed")
        }
    }

    fn finish(self, cutoff: Option<DateTime<FixedOffset>>) -> EloStat {
        // Promotions only apply at a player's next game, so anything left here never took effect
        let pending = self.players.values().map(|s| s.promotions().pending().len()).sum::<usize>();
        if pending > 0 {
            warn!(pending, cutoff = ?cutoff, "Promotions left pending at the end of the replay");
        }

        let ratings = self.players.iter().map(|(id, s)| (*id, s.rating)).collect();
        let active: BTreeSet<PlayerId> = self
            .players
            .values()
            .filter(|s| s.rated_games > 0)
            .map(|s| s.player_id)
            .collect();
        let hidden: BTreeSet<PlayerId> = self.players.values().filter(|s| s.hidden).map(|s| s.player_id).collect();

        EloStat {
            cutoff,
            ratings,
            active,
            hidden,
            match_changes: self.match_changes,
            adjustments: self.tracker.into_adjustments(),
            promotion_bonuses: self.promotion_bonuses,
            players: self.players
        }
    }
}
