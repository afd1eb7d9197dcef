mod combat_scene;
mod event_scene;
mod game_common;
mod journal_scene;
mod map_scene;
mod stats_panel;

use knight_quiz::combat::CombatEvent;
use knight_quiz::core::{Game, GameEvent, Mode};
use knight_quiz::map::{MapEvent, RankView};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};
use rand::Rng;

/// How long a feedback message stays on screen
const FEEDBACK_MS: u64 = 1_500;
/// How long the screen flashes red after a failed block
const FLASH_MS: u64 = 300;
/// How long the enemy shakes after a hit
const SHAKE_MS: u64 = 400;
/// Messages kept in the journal log
const MAX_LOG_LINES: usize = 6;

/// Transient presentation state built up from engine events.
#[derive(Debug, Default)]
pub struct UiState {
    pub feedback: Option<Feedback>,
    /// Free-text answer being typed
    pub input_buffer: String,
    /// Index into the clickable nodes on the map
    pub map_cursor: usize,
    pub flash_ms: u64,
    pub shake_ms: u64,
    /// Last sound cue key, shown in the status line
    pub last_cue: Option<&'static str>,
    pub music: Option<&'static str>,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub text: String,
    pub success: bool,
    pub remaining_ms: u64,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    fn show_feedback(&mut self, text: impl Into<String>, success: bool) {
        self.feedback = Some(Feedback {
            text: text.into(),
            success,
            remaining_ms: FEEDBACK_MS,
        });
    }

    fn push_log(&mut self, line: String) {
        self.log.push(line);
        if self.log.len() > MAX_LOG_LINES {
            self.log.remove(0);
        }
    }

    /// Folds a batch of engine events into the presentation state.
    pub fn apply(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::Combat(e) => self.apply_combat(e),
                GameEvent::Map(e) => self.apply_map(e),
                GameEvent::WorldEntered { name, .. } => {
                    self.map_cursor = 0;
                    self.push_log(format!("Entered {}", name));
                }
                GameEvent::GameOver => self.push_log("You have fallen.".to_string()),
                GameEvent::RunComplete => self.push_log("Every world is free!".to_string()),
            }
        }
    }

    fn apply_combat(&mut self, event: &CombatEvent) {
        match event {
            CombatEvent::Feedback { text, success } => self.show_feedback(*text, *success),
            CombatEvent::QuestionShown(_) => self.input_buffer.clear(),
            CombatEvent::EnemySetup { name, .. } => {
                self.push_log(format!("A {} blocks the path!", name));
            }
            CombatEvent::EnemyHit { .. } => self.shake_ms = SHAKE_MS,
            CombatEvent::DamageFlash => self.flash_ms = FLASH_MS,
            CombatEvent::Sound(cue) => self.last_cue = Some(cue.key()),
            CombatEvent::Music(track) => self.music = Some(track.key()),
            CombatEvent::Victory => self.push_log("Victory!".to_string()),
            _ => {}
        }
    }

    fn apply_map(&mut self, event: &MapEvent) {
        match event {
            MapEvent::Feedback { text, success } => self.show_feedback(text.clone(), *success),
            MapEvent::ItemGained(item) => self.push_log(format!("Found a {}", item.name)),
            MapEvent::ItemUsed { name, healed } => {
                self.push_log(format!("Used {} (+{} HP)", name, healed));
            }
            MapEvent::NodeCompleted(completion) => {
                self.map_cursor = 0;
                self.push_log(format!("Cleared node {}", completion.node_id));
            }
            MapEvent::Sound(cue) => self.last_cue = Some(cue.key()),
            _ => {}
        }
    }

    /// Counts down transient effects.
    pub fn tick(&mut self, delta_ms: u64) {
        if let Some(feedback) = self.feedback.as_mut() {
            feedback.remaining_ms = feedback.remaining_ms.saturating_sub(delta_ms);
            if feedback.remaining_ms == 0 {
                self.feedback = None;
            }
        }
        self.flash_ms = self.flash_ms.saturating_sub(delta_ms);
        self.shake_ms = self.shake_ms.saturating_sub(delta_ms);
    }
}

/// Node IDs the map cursor can land on, in rank order
pub fn clickable_nodes(views: &[RankView]) -> Vec<u32> {
    views
        .iter()
        .flat_map(|rank| rank.nodes.iter())
        .filter(|node| node.clickable)
        .map(|node| node.id)
        .collect()
}

/// Main UI drawing function
pub fn draw_ui<R: Rng>(frame: &mut Frame, game: &Game<R>, ui: &UiState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(10)])
        .split(size);

    stats_panel::draw_stats_panel(frame, chunks[0], game.state(), ui);

    match game.mode() {
        Mode::Map => map_scene::draw_map_scene(frame, chunks[1], game, ui),
        Mode::Combat => combat_scene::draw_combat_scene(frame, chunks[1], game.state(), ui),
        Mode::Interlude(interlude) => {
            event_scene::draw_interlude(frame, chunks[1], interlude);
        }
        Mode::Lesson { lesson, page } => {
            journal_scene::draw_journal(frame, chunks[1], lesson, *page);
        }
        Mode::GameOver => event_scene::draw_game_over(frame, chunks[1], game.state()),
        Mode::RunComplete => event_scene::draw_run_complete(frame, chunks[1], game.state()),
    }

    if let Some(feedback) = &ui.feedback {
        game_common::render_feedback_banner(frame, chunks[1], feedback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knight_quiz::audio::AudioCue;

    #[test]
    fn test_feedback_expires() {
        let mut ui = UiState::new();
        ui.apply(&[GameEvent::Combat(CombatEvent::Feedback {
            text: "Correct!",
            success: true,
        })]);
        assert!(ui.feedback.is_some());
        ui.tick(FEEDBACK_MS - 1);
        assert!(ui.feedback.is_some());
        ui.tick(1);
        assert!(ui.feedback.is_none());
    }

    #[test]
    fn test_flash_and_cue() {
        let mut ui = UiState::new();
        ui.apply(&[
            GameEvent::Combat(CombatEvent::DamageFlash),
            GameEvent::Combat(CombatEvent::Sound(AudioCue::Hurt)),
        ]);
        assert_eq!(ui.flash_ms, FLASH_MS);
        assert_eq!(ui.last_cue, Some("sfx_hurt"));
        ui.tick(FLASH_MS);
        assert_eq!(ui.flash_ms, 0);
    }

    #[test]
    fn test_log_is_bounded() {
        let mut ui = UiState::new();
        for i in 0..20 {
            ui.push_log(format!("line {}", i));
        }
        assert_eq!(ui.log.len(), MAX_LOG_LINES);
        assert_eq!(ui.log.last().map(String::as_str), Some("line 19"));
    }
}
