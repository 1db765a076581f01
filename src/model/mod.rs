pub mod constants;
pub mod data_processing;
pub mod estimation;
pub mod formula;
pub mod inactivity;
pub mod player_state;
pub mod promotion;
pub mod rating_engine;
pub mod rating_tracker;
pub mod records;
pub mod structures;
