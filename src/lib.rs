pub mod player;
pub mod team;
pub mod results;
pub mod standings;
pub mod stats;
pub mod error;
pub mod test_utils;
