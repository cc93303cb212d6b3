//! Shared domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Positive numeric identifier chosen by the operator.
    pub id: i32,
    /// Display name, matched case-insensitively on lookup.
    pub username: String,
    /// Contact address; not validated.
    #[serde(default)]
    pub email: String,
}

impl Player {
    /// Build a player from its raw fields.
    pub fn new(id: i32, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
        }
    }

    /// Case-insensitive comparison against a username query.
    pub fn matches_username(&self, query: &str) -> bool {
        self.username
            .chars()
            .flat_map(char::to_lowercase)
            .eq(query.chars().flat_map(char::to_lowercase))
    }
}

/// A game available in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Positive numeric identifier chosen by the operator.
    pub id: i32,
    /// Human-readable game title.
    pub title: String,
    /// Free-form genre label.
    #[serde(default)]
    pub genre: String,
}

impl Game {
    /// Build a game from its raw fields.
    pub fn new(id: i32, title: impl Into<String>, genre: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            genre: genre.into(),
        }
    }
}

/// Cumulative play data for one player on one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerGameStats {
    /// Player half of the composite key.
    pub player_id: i32,
    /// Game half of the composite key.
    pub game_id: i32,
    /// Total hours across every recorded session.
    pub hours_played: f64,
    /// Best score seen so far.
    pub high_score: i32,
    /// When the most recent session was recorded.
    pub last_played: DateTime<Utc>,
}

impl PlayerGameStats {
    /// Stats for the first session recorded on a player/game pair.
    pub fn first_session(
        player_id: i32,
        game_id: i32,
        hours: f64,
        score: i32,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            player_id,
            game_id,
            hours_played: hours,
            high_score: score,
            last_played: at,
        }
    }

    /// Whether this record belongs to the given player/game pair.
    pub fn is_for(&self, player_id: i32, game_id: i32) -> bool {
        self.player_id == player_id && self.game_id == game_id
    }

    /// Fold another session into the totals.
    ///
    /// Hours accumulate and the high score only ever moves up.
    pub fn record_session(&mut self, hours: f64, score: i32, at: DateTime<Utc>) {
        self.hours_played += hours;
        self.high_score = self.high_score.max(score);
        self.last_played = at;
    }
}
