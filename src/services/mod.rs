pub mod player_service;
pub mod stats_source;

pub use player_service::*;
pub use stats_source::*;
