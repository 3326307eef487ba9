pub mod lines;
pub mod probability;
pub mod teams;

pub use lines::{build_game_slate, scrape_games, scrape_league, GameLines, GameSlate};
