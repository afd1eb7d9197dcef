//! Knight Quiz - terminal quiz-combat adventure.
//!
//! The library holds the whole game engine: world loading, map
//! progression, quiz combat with its block minigame, and saves. The binary
//! adds a ratatui front-end on top.

pub mod audio;
pub mod build_info;
pub mod combat;
pub mod core;
pub mod map;
pub mod save_manager;
pub mod world;
