pub mod elo_stat;
pub mod player_class;
pub mod rank;
pub mod rating_adjustment_type;
pub mod rating_regime;
