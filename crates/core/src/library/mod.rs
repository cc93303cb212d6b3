//! The game library service: validation, gameplay upserts, lookups and ranking.

pub mod ranking;
mod service;

pub use ranking::{rank_by_hours, rank_by_hours_manual};
pub use service::{GameLibrary, StorePaths, GAMES_STORE, PLAYERS_STORE, STATS_STORE};
