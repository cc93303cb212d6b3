use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::{
    audit::AuditLog,
    error::{Entity, LibraryError},
    models::{Game, Player, PlayerGameStats},
    storage::JsonStore,
};

use super::ranking::{rank_by_hours, rank_by_hours_manual};

/// Default file name of the player store.
pub const PLAYERS_STORE: &str = "players.json";
/// Default file name of the game store.
pub const GAMES_STORE: &str = "games.json";
/// Default file name of the stats store.
pub const STATS_STORE: &str = "stats.json";

/// Locations of the three stores backing a [`GameLibrary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    /// Player store file.
    pub players: PathBuf,
    /// Game store file.
    pub games: PathBuf,
    /// Stats store file.
    pub stats: PathBuf,
}

impl StorePaths {
    /// Use the default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            players: dir.join(PLAYERS_STORE),
            games: dir.join(GAMES_STORE),
            stats: dir.join(STATS_STORE),
        }
    }
}

/// Owns the players, games and stats collections and keeps them on disk.
///
/// Every mutating call validates first, then applies the change, saves the
/// affected store and finally writes an audit entry. If the save fails the
/// change is undone, so callers never observe state that is not on disk.
pub struct GameLibrary<A> {
    players: Vec<Player>,
    games: Vec<Game>,
    stats: Vec<PlayerGameStats>,
    player_store: JsonStore<Player>,
    game_store: JsonStore<Game>,
    stats_store: JsonStore<PlayerGameStats>,
    audit: A,
}

impl<A: AuditLog> GameLibrary<A> {
    /// Load all three stores and build a library around them.
    ///
    /// Missing or damaged stores start out empty.
    #[instrument(skip(audit))]
    pub fn open(paths: StorePaths, audit: A) -> Self {
        let player_store = JsonStore::new(paths.players);
        let game_store = JsonStore::new(paths.games);
        let stats_store = JsonStore::new(paths.stats);

        let players = player_store.load();
        let games = game_store.load();
        let stats = stats_store.load();
        info!(
            players = players.len(),
            games = games.len(),
            stats = stats.len(),
            "game library opened"
        );

        Self {
            players,
            games,
            stats,
            player_store,
            game_store,
            stats_store,
            audit,
        }
    }

    /// Register a new player.
    ///
    /// Ids and usernames are not checked for uniqueness.
    pub fn add_player(&mut self, player: Player) -> Result<(), LibraryError> {
        if player.username.trim().is_empty() {
            return Err(LibraryError::invalid("username is required"));
        }

        let message = format!("Added player {} (Id={}).", player.username, player.id);
        self.players.push(player);
        if let Err(err) = self.player_store.save(&self.players) {
            self.players.pop();
            return Err(err.into());
        }

        debug!(count = self.players.len(), "player added");
        self.audit.log(&message);
        Ok(())
    }

    /// Register a new game. Ids are not checked for uniqueness.
    pub fn add_game(&mut self, game: Game) -> Result<(), LibraryError> {
        if game.title.trim().is_empty() {
            return Err(LibraryError::invalid("title is required"));
        }

        let message = format!("Added game {} (Id={}).", game.title, game.id);
        self.games.push(game);
        if let Err(err) = self.game_store.save(&self.games) {
            self.games.pop();
            return Err(err.into());
        }

        debug!(count = self.games.len(), "game added");
        self.audit.log(&message);
        Ok(())
    }

    /// Record a play session, creating the stats row for the pair on first use
    /// and accumulating into it afterwards.
    pub fn record_gameplay(
        &mut self,
        player_id: i32,
        game_id: i32,
        hours: f64,
        score: i32,
    ) -> Result<&PlayerGameStats, LibraryError> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(LibraryError::invalid(format!(
                "hours must be a positive number, got {hours}"
            )));
        }

        let username = self
            .players
            .iter()
            .find(|p| p.id == player_id)
            .map(|p| p.username.clone())
            .ok_or(LibraryError::NotFound {
                entity: Entity::Player,
                id: player_id,
            })?;
        if self.find_game_by_id(game_id).is_none() {
            return Err(LibraryError::NotFound {
                entity: Entity::Game,
                id: game_id,
            });
        }

        let existing = self.stats.iter().position(|s| s.is_for(player_id, game_id));
        if let Some(index) = existing {
            let total = self.stats[index].hours_played + hours;
            if !total.is_finite() {
                return Err(LibraryError::invalid(format!(
                    "total hours would overflow, got {hours} on top of {}",
                    self.stats[index].hours_played
                )));
            }
        }

        let now = Utc::now();
        let (index, previous) = match existing {
            Some(index) => {
                let previous = self.stats[index].clone();
                self.stats[index].record_session(hours, score, now);
                (index, Some(previous))
            }
            None => {
                self.stats.push(PlayerGameStats::first_session(
                    player_id, game_id, hours, score, now,
                ));
                (self.stats.len() - 1, None)
            }
        };

        if let Err(err) = self.stats_store.save(&self.stats) {
            match previous {
                Some(previous) => self.stats[index] = previous,
                None => {
                    self.stats.pop();
                }
            }
            return Err(err.into());
        }

        debug!(player_id, game_id, hours, score, "gameplay recorded");
        self.audit.log(&format!("Recorded gameplay for player {username}."));
        Ok(&self.stats[index])
    }

    /// First player with the given id, if any.
    pub fn find_player_by_id(&self, id: i32) -> Result<Option<&Player>, LibraryError> {
        if id <= 0 {
            return Err(LibraryError::invalid(format!(
                "player id must be positive, got {id}"
            )));
        }
        Ok(self.players.iter().find(|p| p.id == id))
    }

    /// First player whose username matches `username`, ignoring case.
    pub fn find_player_by_username(
        &self,
        username: &str,
    ) -> Result<Option<&Player>, LibraryError> {
        if username.trim().is_empty() {
            return Err(LibraryError::invalid("username is required"));
        }
        Ok(self.players.iter().find(|p| p.matches_username(username)))
    }

    /// First game with the given id, if any.
    pub fn find_game_by_id(&self, id: i32) -> Option<&Game> {
        self.games.iter().find(|g| g.id == id)
    }

    /// All stats rows ordered by hours played, most first.
    pub fn top_players_by_hours(&self) -> Vec<PlayerGameStats> {
        rank_by_hours(&self.stats)
    }

    /// Same result as [`Self::top_players_by_hours`], via a bubble sort.
    pub fn top_players_by_hours_manual(&self) -> Vec<PlayerGameStats> {
        rank_by_hours_manual(&self.stats)
    }

    /// Players in insertion order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Games in insertion order.
    pub fn games(&self) -> &[Game] {
        &self.games
    }

    /// Stats rows in insertion order.
    pub fn stats(&self) -> &[PlayerGameStats] {
        &self.stats
    }

    /// The audit sink this library writes to.
    pub fn audit(&self) -> &A {
        &self.audit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::NullAuditLog;
    use anyhow::Result;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    #[derive(Debug, Default)]
    struct RecordingAudit {
        messages: Vec<String>,
    }

    impl AuditLog for RecordingAudit {
        fn log(&mut self, message: &str) {
            self.messages.push(message.to_string());
        }
    }

    fn library() -> Result<(TempDir, GameLibrary<RecordingAudit>)> {
        let dir = tempdir()?;
        let library =
            GameLibrary::open(StorePaths::in_dir(dir.path()), RecordingAudit::default());
        Ok((dir, library))
    }

    fn seeded() -> Result<(TempDir, GameLibrary<RecordingAudit>)> {
        let (dir, mut library) = library()?;
        library.add_player(Player::new(1, "p1", "p1@test.com"))?;
        library.add_game(Game::new(10, "Game A", "Action"))?;
        Ok((dir, library))
    }

    #[test]
    fn added_player_is_found_by_id() -> Result<()> {
        let (_dir, mut library) = library()?;
        let player = Player::new(1, "test", "t@test.com");

        library.add_player(player.clone())?;

        assert_eq!(library.find_player_by_id(1)?, Some(&player));
        assert_eq!(
            library.audit().messages,
            vec!["Added player test (Id=1).".to_string()]
        );
        Ok(())
    }

    #[test]
    fn blank_username_is_rejected_without_side_effects() -> Result<()> {
        let (dir, mut library) = library()?;

        for username in ["", "   ", "\t\n"] {
            let err = library
                .add_player(Player::new(2, username, "x@test.com"))
                .unwrap_err();
            assert!(matches!(err, LibraryError::InvalidArgument(_)));
        }

        assert!(library.players().is_empty());
        assert!(library.audit().messages.is_empty());
        assert!(!dir.path().join(PLAYERS_STORE).exists());
        Ok(())
    }

    #[test]
    fn blank_title_is_rejected() -> Result<()> {
        let (_dir, mut library) = library()?;
        let err = library.add_game(Game::new(1, " ", "Puzzle")).unwrap_err();
        assert!(matches!(err, LibraryError::InvalidArgument(_)));
        assert!(library.games().is_empty());
        Ok(())
    }

    #[test]
    fn duplicate_ids_are_accepted_and_first_wins() -> Result<()> {
        let (_dir, mut library) = library()?;
        library.add_player(Player::new(5, "first", ""))?;
        library.add_player(Player::new(5, "second", ""))?;

        assert_eq!(library.players().len(), 2);
        assert_eq!(
            library.find_player_by_id(5)?.map(|p| p.username.as_str()),
            Some("first")
        );
        Ok(())
    }

    #[test]
    fn first_session_creates_stats() -> Result<()> {
        let (_dir, mut library) = seeded()?;
        let before = Utc::now();

        library.record_gameplay(1, 10, 2.5, 100)?;

        let ranked = library.top_players_by_hours_manual();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].player_id, 1);
        assert_eq!(ranked[0].game_id, 10);
        assert!((ranked[0].hours_played - 2.5).abs() < 0.001);
        assert_eq!(ranked[0].high_score, 100);
        assert!(ranked[0].last_played >= before);
        Ok(())
    }

    #[test]
    fn second_session_accumulates_hours_and_raises_high_score() -> Result<()> {
        let (_dir, mut library) = seeded()?;

        let first_played = library.record_gameplay(1, 10, 1.0, 50)?.last_played;
        let stats = library.record_gameplay(1, 10, 2.0, 120)?.clone();

        assert_eq!(library.stats().len(), 1);
        assert_eq!(stats.player_id, 1);
        assert_eq!(stats.game_id, 10);
        assert!((stats.hours_played - 3.0).abs() < 0.001);
        assert_eq!(stats.high_score, 120);
        assert!(stats.last_played >= first_played);
        Ok(())
    }

    #[test]
    fn lower_score_does_not_replace_high_score() -> Result<()> {
        let (_dir, mut library) = seeded()?;
        library.record_gameplay(1, 10, 1.0, 300)?;
        let stats = library.record_gameplay(1, 10, 0.5, 20)?;
        assert_eq!(stats.high_score, 300);
        assert!((stats.hours_played - 1.5).abs() < 0.001);
        Ok(())
    }

    #[test]
    fn non_positive_hours_are_rejected() -> Result<()> {
        let (_dir, mut library) = seeded()?;
        for hours in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = library.record_gameplay(1, 10, hours, 10).unwrap_err();
            assert!(matches!(err, LibraryError::InvalidArgument(_)), "{hours}");
        }
        assert!(library.stats().is_empty());
        Ok(())
    }

    #[test]
    fn overflowing_total_is_rejected_and_store_stays_readable() -> Result<()> {
        let (dir, mut library) = seeded()?;
        library.add_player(Player::new(2, "p2", ""))?;
        library.record_gameplay(2, 10, 1.0, 5)?;
        library.record_gameplay(1, 10, 1e308, 1)?;
        let before = library.stats().to_vec();

        let err = library.record_gameplay(1, 10, 1e308, 2).unwrap_err();
        assert!(matches!(err, LibraryError::InvalidArgument(_)));
        assert_eq!(library.stats(), before.as_slice());
        drop(library);

        let reopened = GameLibrary::open(StorePaths::in_dir(dir.path()), NullAuditLog);
        assert_eq!(reopened.stats().len(), 2);
        assert_eq!(reopened.stats()[1].hours_played, 1e308);
        assert_eq!(reopened.stats()[1].high_score, 1);
        Ok(())
    }

    #[test]
    fn hours_are_validated_before_lookups() -> Result<()> {
        let (_dir, mut library) = library()?;
        let err = library.record_gameplay(99, 99, 0.0, 0).unwrap_err();
        assert!(matches!(err, LibraryError::InvalidArgument(_)));
        Ok(())
    }

    #[test]
    fn unknown_player_or_game_is_not_found() -> Result<()> {
        let (_dir, mut library) = seeded()?;
        library.record_gameplay(1, 10, 1.0, 5)?;
        let before = library.stats().to_vec();

        let err = library.record_gameplay(2, 10, 1.0, 5).unwrap_err();
        assert!(matches!(
            err,
            LibraryError::NotFound {
                entity: Entity::Player,
                id: 2
            }
        ));

        let err = library.record_gameplay(1, 11, 1.0, 5).unwrap_err();
        assert!(matches!(
            err,
            LibraryError::NotFound {
                entity: Entity::Game,
                id: 11
            }
        ));

        assert_eq!(library.stats(), before.as_slice());
        Ok(())
    }

    #[test]
    fn gameplay_is_audited_with_username() -> Result<()> {
        let (_dir, mut library) = seeded()?;
        library.record_gameplay(1, 10, 1.0, 5)?;
        assert_eq!(
            library.audit().messages.last().map(String::as_str),
            Some("Recorded gameplay for player p1.")
        );
        assert_eq!(library.audit().messages.len(), 3);
        Ok(())
    }

    #[test]
    fn lookup_by_id_distinguishes_absent_from_invalid() -> Result<()> {
        let (_dir, library) = seeded()?;
        assert_eq!(library.find_player_by_id(2)?, None);
        assert!(matches!(
            library.find_player_by_id(0),
            Err(LibraryError::InvalidArgument(_))
        ));
        assert!(matches!(
            library.find_player_by_id(-3),
            Err(LibraryError::InvalidArgument(_))
        ));
        Ok(())
    }

    #[test]
    fn lookup_by_username_ignores_case() -> Result<()> {
        let (_dir, mut library) = seeded()?;
        library.add_player(Player::new(2, "MixedCase", "m@test.com"))?;

        assert_eq!(
            library.find_player_by_username("mixedcase")?.map(|p| p.id),
            Some(2)
        );
        assert_eq!(library.find_player_by_username("P1")?.map(|p| p.id), Some(1));
        assert_eq!(library.find_player_by_username("nobody")?, None);
        assert!(matches!(
            library.find_player_by_username("  "),
            Err(LibraryError::InvalidArgument(_))
        ));
        Ok(())
    }

    #[test]
    fn ranking_puts_most_hours_first() -> Result<()> {
        let (_dir, mut library) = seeded()?;
        library.add_player(Player::new(2, "p2", "p2@test.com"))?;

        library.record_gameplay(1, 10, 1.0, 50)?;
        library.record_gameplay(2, 10, 5.0, 60)?;

        let ranked = library.top_players_by_hours_manual();
        assert_eq!(ranked.len(), 2);
        assert!(ranked[0].hours_played >= ranked[1].hours_played);
        assert_eq!(ranked[0].player_id, 2);
        assert_eq!(ranked, library.top_players_by_hours());
        Ok(())
    }

    #[test]
    fn state_survives_reopening() -> Result<()> {
        let (dir, mut library) = seeded()?;
        library.record_gameplay(1, 10, 1.0, 50)?;
        library.record_gameplay(1, 10, 2.0, 120)?;
        drop(library);

        let reopened = GameLibrary::open(StorePaths::in_dir(dir.path()), NullAuditLog);
        assert_eq!(reopened.players(), &[Player::new(1, "p1", "p1@test.com")]);
        assert_eq!(reopened.games(), &[Game::new(10, "Game A", "Action")]);
        assert_eq!(reopened.stats().len(), 1);
        assert!((reopened.stats()[0].hours_played - 3.0).abs() < 0.001);
        assert_eq!(reopened.stats()[0].high_score, 120);
        Ok(())
    }

    #[test]
    fn corrupt_store_opens_empty() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join(PLAYERS_STORE), "{{{ definitely not json")?;
        fs::write(dir.path().join(STATS_STORE), "")?;

        let library = GameLibrary::open(StorePaths::in_dir(dir.path()), NullAuditLog);
        assert!(library.players().is_empty());
        assert!(library.stats().is_empty());
        Ok(())
    }

    #[test]
    fn failed_save_rolls_back_the_mutation() -> Result<()> {
        let dir = tempdir()?;
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, "not a directory")?;

        let paths = StorePaths {
            players: dir.path().join(PLAYERS_STORE),
            games: dir.path().join(GAMES_STORE),
            stats: blocker.join(STATS_STORE),
        };
        let mut library = GameLibrary::open(paths, RecordingAudit::default());
        library.add_player(Player::new(1, "p1", ""))?;
        library.add_game(Game::new(10, "Game A", ""))?;

        let err = library.record_gameplay(1, 10, 1.0, 5).unwrap_err();
        assert!(matches!(err, LibraryError::Storage(_)));
        assert!(library.stats().is_empty());
        assert_eq!(library.audit().messages.len(), 2);
        Ok(())
    }

    #[test]
    fn failed_save_restores_previous_stats() -> Result<()> {
        let (dir, mut library) = seeded()?;
        library.record_gameplay(1, 10, 1.0, 50)?;
        let before = library.stats().to_vec();

        // Swap the stats file for a directory so the atomic rename fails.
        let stats_path = dir.path().join(STATS_STORE);
        fs::remove_file(&stats_path)?;
        fs::create_dir(&stats_path)?;

        let err = library.record_gameplay(1, 10, 4.0, 900).unwrap_err();
        assert!(matches!(err, LibraryError::Storage(_)));
        assert_eq!(library.stats(), before.as_slice());
        Ok(())
    }
}
