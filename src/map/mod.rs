//! World map: rank-based fog of war and node progression.

pub mod logic;
pub mod types;

pub use logic::{
    acknowledge_lesson, can_move_to, complete_node, compute_ranks, open_lesson, proceed_to_node,
    rank_of, rank_views, restore_map, snapshot_map, start_interlude, tick_interlude, turn_page,
    use_item,
};
pub use types::*;
