pub mod api;
pub mod config;
pub mod directory;
pub mod hero_detail;
pub mod normalize;
pub mod provider;
pub mod rank_board;
pub mod roster;
pub mod state;
