//! Line-oriented menu driving a [`GameLibrary`].

use std::{
    io::{self, BufRead, Write},
    str::FromStr,
};

use anyhow::Result;
use chrono::Local;
use gamelib_core::{AuditLog, Game, GameLibrary, LibraryError, Player};
use tracing::debug;

const MENU: &str = "\
=== Game Library & Player Stats ===
1. Add player
2. Add game
3. Record gameplay
4. Find player by ID
5. Find player by username
6. Show top players by hours
0. Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    AddPlayer,
    AddGame,
    RecordGameplay,
    FindById,
    FindByUsername,
    TopPlayers,
    Exit,
}

impl MenuChoice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::AddPlayer),
            "2" => Some(Self::AddGame),
            "3" => Some(Self::RecordGameplay),
            "4" => Some(Self::FindById),
            "5" => Some(Self::FindByUsername),
            "6" => Some(Self::TopPlayers),
            "0" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Why a menu flow stopped before finishing.
#[derive(Debug)]
enum Interrupt {
    /// Input reached end of file.
    Closed,
    /// A numeric field could not be parsed.
    InvalidNumber(String),
    /// The library rejected the request.
    Library(LibraryError),
    /// Reading input or writing output failed.
    Io(io::Error),
}

impl From<io::Error> for Interrupt {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<LibraryError> for Interrupt {
    fn from(err: LibraryError) -> Self {
        Self::Library(err)
    }
}

type FlowResult = std::result::Result<(), Interrupt>;

/// Interactive menu reading choices from `input` and printing to `output`.
pub struct Shell<'a, A, R, W> {
    library: &'a mut GameLibrary<A>,
    input: R,
    output: W,
}

impl<'a, A, R, W> Shell<'a, A, R, W>
where
    A: AuditLog,
    R: BufRead,
    W: Write,
{
    pub fn new(library: &'a mut GameLibrary<A>, input: R, output: W) -> Self {
        Self {
            library,
            input,
            output,
        }
    }

    /// Run until the operator picks exit or input is exhausted.
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "{MENU}")?;
            let choice = match self.prompt("Choice: ")? {
                Some(choice) => choice,
                None => break,
            };
            writeln!(self.output)?;

            let selection = MenuChoice::parse(&choice);
            debug!(?selection, "menu selection");
            let outcome = match selection {
                Some(MenuChoice::Exit) => break,
                Some(MenuChoice::AddPlayer) => self.add_player(),
                Some(MenuChoice::AddGame) => self.add_game(),
                Some(MenuChoice::RecordGameplay) => self.record_gameplay(),
                Some(MenuChoice::FindById) => self.find_by_id(),
                Some(MenuChoice::FindByUsername) => self.find_by_username(),
                Some(MenuChoice::TopPlayers) => self.show_top_players(),
                None => {
                    writeln!(self.output, "Invalid choice.")?;
                    Ok(())
                }
            };

            match outcome {
                Ok(()) => {}
                Err(Interrupt::Closed) => break,
                Err(Interrupt::InvalidNumber(raw)) => {
                    writeln!(self.output, "Invalid number: {raw:?}.")?
                }
                Err(Interrupt::Library(err)) => writeln!(self.output, "Error: {err}")?,
                Err(Interrupt::Io(err)) => return Err(err.into()),
            }
            writeln!(self.output)?;
        }

        self.output.flush()?;
        Ok(())
    }

    fn add_player(&mut self) -> FlowResult {
        let id = self.number("Player Id: ")?;
        let username = self.text("Username: ")?;
        let email = self.text("Email: ")?;

        self.library.add_player(Player::new(id, username, email))?;
        writeln!(self.output, "Player added.")?;
        Ok(())
    }

    fn add_game(&mut self) -> FlowResult {
        let id = self.number("Game Id: ")?;
        let title = self.text("Title: ")?;
        let genre = self.text("Genre: ")?;

        self.library.add_game(Game::new(id, title, genre))?;
        writeln!(self.output, "Game added.")?;
        Ok(())
    }

    fn record_gameplay(&mut self) -> FlowResult {
        let player_id = self.number("Player Id: ")?;
        let game_id = self.number("Game Id: ")?;
        let hours = self.number("Hours played: ")?;
        let score = self.number("New score (0 if none): ")?;

        let stats = self
            .library
            .record_gameplay(player_id, game_id, hours, score)?;
        writeln!(
            self.output,
            "Gameplay recorded. Total hours={}, HighScore={}",
            stats.hours_played, stats.high_score
        )?;
        Ok(())
    }

    fn find_by_id(&mut self) -> FlowResult {
        let id = self.number("Player Id: ")?;
        let player = self.library.find_player_by_id(id)?.cloned();
        self.print_player(player.as_ref())
    }

    fn find_by_username(&mut self) -> FlowResult {
        let username = self.text("Username: ")?;
        let player = self.library.find_player_by_username(&username)?.cloned();
        self.print_player(player.as_ref())
    }

    fn show_top_players(&mut self) -> FlowResult {
        let ranked = self.library.top_players_by_hours_manual();
        if ranked.is_empty() {
            writeln!(self.output, "No stats yet.")?;
            return Ok(());
        }

        for stats in ranked {
            writeln!(
                self.output,
                "PlayerId={}, GameId={}, Hours={}, HighScore={}, LastPlayed={}",
                stats.player_id,
                stats.game_id,
                stats.hours_played,
                stats.high_score,
                stats
                    .last_played
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
            )?;
        }
        Ok(())
    }

    fn print_player(&mut self, player: Option<&Player>) -> FlowResult {
        match player {
            Some(player) => writeln!(
                self.output,
                "Id={}, Username={}, Email={}",
                player.id, player.username, player.email
            )?,
            None => writeln!(self.output, "Player not found.")?,
        }
        Ok(())
    }

    fn text(&mut self, label: &str) -> std::result::Result<String, Interrupt> {
        self.prompt(label)?.ok_or(Interrupt::Closed)
    }

    fn number<T: FromStr>(&mut self, label: &str) -> std::result::Result<T, Interrupt> {
        let raw = self.text(label)?;
        raw.trim()
            .parse()
            .map_err(|_| Interrupt::InvalidNumber(raw.trim().to_string()))
    }

    /// Print `label` and read one line without its terminator.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}
