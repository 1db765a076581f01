// Default formula constants
pub const DEFAULT_RATING: f64 = 1500.0;
pub const ABSOLUTE_RATING_FLOOR: f64 = 100.0;
pub const LOGISTIC_SCALE: f64 = 400.0;
pub const BRADLEY_TERRY_C: f64 = 7.0;
pub const BRADLEY_TERRY_CEILING: f64 = 3300.0;
pub const POWER_K_DIVISOR: f64 = 200.0;
pub const POWER_K_EXPONENT: f64 = 1.6;
// Keeps β(r) finite when a rating approaches the Bradley-Terry ceiling
pub const CEILING_MARGIN: f64 = 1.0;

// Rank scale (1k = 2000, 1d = 2100, 1p = 2700)
pub const KYU_ONE_RATING: f64 = 2000.0;
pub const DAN_ONE_RATING: f64 = 2100.0;
pub const PRO_ONE_RATING: f64 = 2700.0;
pub const KYU_STEP: f64 = 100.0;
pub const DAN_STEP: f64 = 100.0;
pub const PRO_STEP: f64 = 30.0;
// Promotions into this dan rank and above carry no bonus
pub const PROMOTION_CEILING_DAN: u8 = 5;

// Performance estimation windows
pub const LONG_WINDOW_GAMES: u32 = 12;
pub const SHORT_WINDOW_GAMES: u32 = 6;
pub const LONG_WINDOW_DECAY: f64 = 6.0;
pub const SHORT_WINDOW_MULTIPLIER: f64 = 2.0;
pub const OPPONENT_PROTECTION_MULTIPLIER: f64 = 0.5;
pub const ESTIMATION_WEIGHT_BASE: f64 = 1000.0;
pub const ESTIMATION_DIFF_SCALE: f64 = 100.0;
pub const ESTIMATION_DIFF_LIMIT: f64 = 200.0;
pub const ESTIMATION_RESULT_MARGIN: f64 = 150.0;
pub const ESTIMATION_CORRECTION_SHARE: f64 = 0.5;
pub const WIN_RATE_EPSILON: f64 = 0.001;

// Promotions
pub const PROMOTION_HALF_STEP: f64 = 0.5;

// Returning players
pub const INACTIVITY_GAP_DAYS: i64 = 730;
