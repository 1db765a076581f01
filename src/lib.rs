pub mod error;
pub mod model;
pub mod standings;
pub mod utils;

pub use error::EngineError;
