//! World data: map graphs, curricula and lessons, and the loader that
//! installs them into the game state.

pub mod loader;
pub mod types;

pub use loader::{
    install_world, load_world, questions_for_node, world_from_json, JsonWorldSource,
    MemoryWorldSource, WorldSource,
};
pub use types::*;
