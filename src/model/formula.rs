use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    error::EngineError,
    model::{
        constants::{
            ABSOLUTE_RATING_FLOOR, BRADLEY_TERRY_C, BRADLEY_TERRY_CEILING, CEILING_MARGIN, DEFAULT_RATING,
            LOGISTIC_SCALE, POWER_K_DIVISOR, POWER_K_EXPONENT, PROMOTION_CEILING_DAN
        },
        structures::rank::{Rank, RankScale}
    }
};

/// Shape of the expected-score curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExpectedScore {
    /// `1 / (1 + 10^((Rb - Ra) / scale))`
    Logistic { scale: f64 },
    /// Bradley-Terry over `β(r) = -c·ln(ceiling - r)`
    BradleyTerry { c: f64, ceiling: f64 }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KStep {
    /// Applies to ratings strictly below this bound
    pub below: f64,
    pub k: f64
}

/// K-factor (volatility) as a function of the current rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Volatility {
    Steps { steps: Vec<KStep>, top: f64 },
    /// `((ceiling - r) / divisor)^exponent`
    Power { ceiling: f64, divisor: f64, exponent: f64 }
}

/// Named formula variants a league can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FormulaPreset {
    Standard,
    Gor
}

/// Scale constants and K-table of one rating variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaConfig {
    pub name: String,
    pub expected: ExpectedScore,
    pub volatility: Volatility,
    pub min_rating: f64,
    pub default_rating: f64,
    #[serde(default)]
    pub rank_scale: RankScale,
    /// Promotions into ranks rated at or above this value earn no bonus
    pub promotion_ceiling: f64
}

impl FormulaConfig {
    pub fn preset(preset: FormulaPreset) -> FormulaConfig {
        let rank_scale = RankScale::default();
        let promotion_ceiling = rank_scale.rating(Rank::Dan(PROMOTION_CEILING_DAN));

        match preset {
            FormulaPreset::Standard => FormulaConfig {
                name: preset.to_string(),
                expected: ExpectedScore::Logistic { scale: LOGISTIC_SCALE },
                volatility: Volatility::Steps {
                    steps: vec![
                        KStep { below: 1200.0, k: 32.0 },
                        KStep { below: 1600.0, k: 24.0 },
                        KStep { below: 2000.0, k: 16.0 },
                        KStep { below: 2400.0, k: 12.0 }
                    ],
                    top: 10.0
                },
                min_rating: ABSOLUTE_RATING_FLOOR,
                default_rating: DEFAULT_RATING,
                rank_scale,
                promotion_ceiling
            },
            FormulaPreset::Gor => FormulaConfig {
                name: preset.to_string(),
                expected: ExpectedScore::BradleyTerry {
                    c: BRADLEY_TERRY_C,
                    ceiling: BRADLEY_TERRY_CEILING
                },
                volatility: Volatility::Power {
                    ceiling: BRADLEY_TERRY_CEILING,
                    divisor: POWER_K_DIVISOR,
                    exponent: POWER_K_EXPONENT
                },
                min_rating: ABSOLUTE_RATING_FLOOR,
                default_rating: DEFAULT_RATING,
                rank_scale,
                promotion_ceiling
            }
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        match &self.expected {
            ExpectedScore::Logistic { scale } if *scale <= 0.0 => {
                return Err(EngineError::InvalidConfig("logistic scale must be positive".to_string()));
            }
            ExpectedScore::BradleyTerry { c, ceiling } if *c <= 0.0 || *ceiling <= self.min_rating => {
                return Err(EngineError::InvalidConfig(
                    "Bradley-Terry needs a positive c and a ceiling above the minimum rating".to_string()
                ));
            }
            _ => {}
        }

        match &self.volatility {
            Volatility::Steps { steps, top } => {
                let ks: Vec<f64> = steps.iter().map(|s| s.k).chain(std::iter::once(*top)).collect();
                if ks.iter().any(|k| *k < 0.0) {
                    return Err(EngineError::InvalidConfig("K-factors must be non-negative".to_string()));
                }
                if steps.windows(2).any(|w| w[0].below >= w[1].below) || ks.windows(2).any(|w| w[0] < w[1]) {
                    return Err(EngineError::InvalidConfig(
                        "K steps must be ordered by rating with non-increasing K".to_string()
                    ));
                }
            }
            Volatility::Power {
                ceiling,
                divisor,
                exponent
            } => {
                if *divisor <= 0.0 || *exponent < 0.0 || *ceiling <= self.min_rating {
                    return Err(EngineError::InvalidConfig("invalid power volatility curve".to_string()));
                }
            }
        }

        if self.default_rating < self.min_rating {
            return Err(EngineError::InvalidConfig(
                "default rating is below the minimum rating".to_string()
            ));
        }

        Ok(())
    }
}

/// One Elo variant. Implementations must keep `expected_scores` summing to 1
/// and monotone in the rating gap, and `k_factor` non-increasing in rating.
pub trait RatingFormula: Send + Sync {
    /// Expected scores of A and B.
    fn expected_scores(&self, rating_a: f64, rating_b: f64) -> (f64, f64);

    /// Base K-factor at `rating`, before any regime multiplier.
    fn k_factor(&self, rating: f64) -> f64;

    fn min_rating(&self) -> f64;

    /// `max(old + k·(actual - expected), min_rating)`
    fn updated_rating(&self, rating: f64, k: f64, actual: f64, expected: f64) -> f64 {
        (rating + k * (actual - expected)).max(self.min_rating())
    }

    /// New ratings of A and B after one game, each side with its own K.
    fn rate(&self, rating_a: f64, rating_b: f64, actual_a: f64, k_a: f64, k_b: f64) -> (f64, f64) {
        let (expected_a, expected_b) = self.expected_scores(rating_a, rating_b);

        (
            self.updated_rating(rating_a, k_a, actual_a, expected_a),
            self.updated_rating(rating_b, k_b, 1.0 - actual_a, expected_b)
        )
    }
}

/// The configuration-driven formula used by every league.
#[derive(Debug, Clone, PartialEq)]
pub struct EloFormula {
    config: FormulaConfig
}

impl EloFormula {
    pub fn new(config: FormulaConfig) -> Result<EloFormula, EngineError> {
        config.validate()?;
        Ok(EloFormula { config })
    }

    pub fn config(&self) -> &FormulaConfig {
        &self.config
    }

    fn strength(c: f64, ceiling: f64, rating: f64) -> f64 {
        -c * (ceiling - rating.min(ceiling - CEILING_MARGIN)).ln()
    }
}

impl RatingFormula for EloFormula {
    fn expected_scores(&self, rating_a: f64, rating_b: f64) -> (f64, f64) {
        let expected_a = match self.config.expected {
            ExpectedScore::Logistic { scale } => 1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / scale)),
            ExpectedScore::BradleyTerry { c, ceiling } => {
                let beta_a = Self::strength(c, ceiling, rating_a);
                let beta_b = Self::strength(c, ceiling, rating_b);
                1.0 / (1.0 + (beta_b - beta_a).exp())
            }
        };

        (expected_a, 1.0 - expected_a)
    }

    fn k_factor(&self, rating: f64) -> f64 {
        match &self.config.volatility {
            Volatility::Steps { steps, top } => steps
                .iter()
                .find(|step| rating < step.below)
                .map(|step| step.k)
                .unwrap_or(*top),
            Volatility::Power {
                ceiling,
                divisor,
                exponent
            } => ((ceiling - rating).max(0.0) / divisor).powf(*exponent)
        }
    }

    fn min_rating(&self) -> f64 {
        self.config.min_rating
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use strum::IntoEnumIterator;

    use crate::model::formula::{
        EloFormula, ExpectedScore, FormulaConfig, FormulaPreset, KStep, RatingFormula, Volatility
    };

    fn formulas() -> Vec<EloFormula> {
        FormulaPreset::iter()
            .map(|p| EloFormula::new(FormulaConfig::preset(p)).unwrap())
            .collect()
    }

    #[test]
    fn test_equal_ratings_scenario() {
        let formula = EloFormula::new(FormulaConfig::preset(FormulaPreset::Standard)).unwrap();
        let k = formula.k_factor(1700.0);
        assert_eq!(k, 16.0);

        let (expected_a, _) = formula.expected_scores(1700.0, 1700.0);
        assert_abs_diff_eq!(expected_a, 0.5);

        let (a, b) = formula.rate(1700.0, 1700.0, 1.0, k, k);
        assert_abs_diff_eq!(a, 1708.0);
        assert_abs_diff_eq!(b, 1692.0);
    }

    #[test]
    fn test_expected_scores_sum_to_one() {
        for formula in formulas() {
            for (a, b) in [(100.0, 100.0), (1500.0, 2300.0), (2900.0, 800.0), (3250.0, 3290.0)] {
                let (ea, eb) = formula.expected_scores(a, b);
                assert_abs_diff_eq!(ea + eb, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_expected_score_monotone_in_gap() {
        for formula in formulas() {
            let mut last = 0.0;
            for gap in (-800..=800).step_by(50) {
                let (ea, _) = formula.expected_scores(1800.0 + gap as f64, 1800.0);
                assert!(ea > last, "{} not monotone at gap {}", formula.config().name, gap);
                last = ea;
            }
        }
    }

    #[test]
    fn test_k_factor_non_increasing() {
        for formula in formulas() {
            let mut last = f64::INFINITY;
            for rating in (100..3200).step_by(25) {
                let k = formula.k_factor(rating as f64);
                assert!(k <= last);
                last = k;
            }
        }
    }

    #[test]
    fn test_floor_holds_on_loss_streak() {
        for formula in formulas() {
            let mut rating = 150.0;
            for _ in 0..200 {
                let (new_rating, _) = formula.rate(rating, rating, 0.0, 40.0, 10.0);
                assert!(new_rating >= formula.min_rating());
                rating = new_rating;
            }
            assert_abs_diff_eq!(rating, formula.min_rating());
        }
    }

    #[test]
    fn test_bradley_terry_near_ceiling_is_finite() {
        let formula = EloFormula::new(FormulaConfig::preset(FormulaPreset::Gor)).unwrap();
        let (ea, eb) = formula.expected_scores(3300.0, 3500.0);

        assert!(ea.is_finite() && eb.is_finite());
        assert_eq!(formula.k_factor(3400.0), 0.0);
    }

    #[test]
    fn test_validate_rejects_increasing_steps() {
        let mut config = FormulaConfig::preset(FormulaPreset::Standard);
        config.volatility = Volatility::Steps {
            steps: vec![KStep { below: 1500.0, k: 10.0 }, KStep { below: 2000.0, k: 20.0 }],
            top: 5.0
        };

        assert!(EloFormula::new(config).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_scale() {
        let mut config = FormulaConfig::preset(FormulaPreset::Standard);
        config.expected = ExpectedScore::Logistic { scale: 0.0 };
        assert!(config.validate().is_err());

        let mut config = FormulaConfig::preset(FormulaPreset::Standard);
        config.default_rating = 50.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_preset_names() {
        assert_eq!("gor".parse::<FormulaPreset>(), Ok(FormulaPreset::Gor));
        assert_eq!(FormulaPreset::Standard.to_string(), "standard");
        assert_eq!(FormulaConfig::preset(FormulaPreset::Gor).promotion_ceiling, 2500.0);
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = FormulaConfig::preset(FormulaPreset::Gor);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: FormulaConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, config);
    }
}
