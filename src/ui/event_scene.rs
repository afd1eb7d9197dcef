//! Interludes and end-of-run screens.

use super::game_common::{centered_rect, render_overlay};
use knight_quiz::core::GameState;
use knight_quiz::map::{Interlude, InterludeKind, InterludeOutcome};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw_interlude(frame: &mut Frame, area: Rect, interlude: &Interlude) {
    let (title, description) = interlude.caption();
    let (icon, color) = match (&interlude.outcome, interlude.kind) {
        (None, _) => ("👣", Color::White),
        (Some(InterludeOutcome::Ambush), _) => ("☠", Color::Red),
        (Some(InterludeOutcome::Reward(_)), InterludeKind::Treasure) => ("💰", Color::Yellow),
        (Some(InterludeOutcome::Reward(_)), InterludeKind::Wildcard) => ("☀", Color::Yellow),
    };

    let mut lines = vec![
        Line::from(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(icon),
        Line::from(""),
        Line::from(description),
    ];
    if let Some(InterludeOutcome::Reward(item)) = &interlude.outcome {
        lines.push(Line::from(Span::styled(
            format!("+ {}", item.name),
            Style::default().fg(Color::Cyan),
        )));
    }

    let outer = Block::default().borders(Borders::ALL).title(" Event ");
    let inner = outer.inner(area);
    frame.render_widget(outer, area);
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        centered_rect(inner.width, 7, inner),
    );
}

pub fn draw_game_over(frame: &mut Frame, area: Rect, state: &GameState) {
    let message = format!(
        "You fell at node {}. Cleared stages: {}",
        state.player.current_node_id,
        state.progression.cleared_stages.len()
    );
    render_overlay(
        frame,
        area,
        Color::Red,
        "DEFEAT",
        &message,
        "[Enter] New run  [Q] Quit",
    );
}

pub fn draw_run_complete(frame: &mut Frame, area: Rect, state: &GameState) {
    let message = format!(
        "Worlds freed: {}. Stages cleared: {}",
        state.progression.unlocked_worlds.len(),
        state.progression.cleared_stages.len()
    );
    render_overlay(
        frame,
        area,
        Color::Green,
        "RUN COMPLETE",
        &message,
        "[Enter] New run  [Q] Quit",
    );
}
