//! Simulation core of a turn-based dungeon crawler.
//!
//! A [`Session`] owns the dungeon floor, the entity registry and the message
//! log. Frontends feed it [`Command`]s through [`Session::handle_command`] and
//! read back what to draw through its query methods.

pub mod actions;
pub mod ai;
pub mod config;
pub mod data;
pub mod ecs;
pub mod error;
pub mod map;
pub mod persistence;
pub mod scripted_input;
pub mod session;

pub use actions::Command;
pub use config::{ConfigError, GameConfig};
pub use error::{ActionFailure, GameError};
pub use session::{GameState, Session, TurnOutcome};
