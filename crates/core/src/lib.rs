#![warn(clippy::all, missing_docs)]

//! Core domain logic for the game library.
//!
//! This crate hosts the player, game and stats models, the library
//! service that validates and records gameplay, and the JSON stores and
//! audit trail it persists through. Frontends drive a [`GameLibrary`]
//! and render what it returns.

pub mod audit;
pub mod config;
pub mod error;
pub mod library;
pub mod models;
pub mod storage;

pub use audit::{AuditLog, FileAuditLog, NullAuditLog};
pub use config::AppConfig;
pub use error::{Entity, LibraryError, StorageError};
pub use library::{GameLibrary, StorePaths};
pub use models::{Game, Player, PlayerGameStats};
pub use storage::JsonStore;
