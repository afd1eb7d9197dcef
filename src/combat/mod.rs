//! Quiz combat: enemy roster, turn state machine and the block minigame.

pub mod logic;
pub mod qte;
pub mod types;

pub use logic::{
    end_combat, generate_new_question, handle_answer, handle_input_answer, pick_question,
    resolve_qte, select_template, start_combat, tick, use_hint,
};
pub use qte::QteState;
pub use types::*;
