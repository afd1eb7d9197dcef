//! Core game state, configuration and the main loop.

pub mod config;
pub mod constants;
pub mod error;
pub mod game_loop;
pub mod game_state;
pub mod schedule;

pub use config::{CombatSettings, GameConfig};
pub use error::{GameError, GameResult};
pub use game_loop::{Game, GameEvent, Mode, PlayerInput};
pub use game_state::{ActiveWorld, GameState, Player, Progression};
