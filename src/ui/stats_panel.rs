use super::UiState;
use knight_quiz::core::GameState;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Draws the top bar: hearts, hints, inventory and the current world
pub fn draw_stats_panel(frame: &mut Frame, area: Rect, state: &GameState, ui: &UiState) {
    let player = &state.player;

    let hearts: String = (0..player.max_hp)
        .map(|i| if i < player.current_hp { '♥' } else { '♡' })
        .collect();

    let world_name = state
        .world
        .as_ref()
        .map(|w| w.name.as_str())
        .unwrap_or("Nowhere");

    let mut spans = vec![
        Span::styled(
            hearts,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("Hints: {}/{}", player.hints, player.max_hints),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("Items: {}", player.inventory.len()),
            Style::default().fg(Color::Cyan),
        ),
    ];

    if let Some(music) = ui.music {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("♫ {}", music),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(cue) = ui.last_cue {
        spans.push(Span::styled(
            format!(" ♪ {}", cue),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let header = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Knight Quiz - {} ", world_name)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(header, area);
}
