//! World map with rank-based fog of war.

use super::{clickable_nodes, UiState};
use knight_quiz::core::Game;
use knight_quiz::map::{NodeView, RankVisibility};
use knight_quiz::world::NodeStatus;
use rand::Rng;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const PLAYER_TOKEN: &str = "♞";

pub fn draw_map_scene<R: Rng>(frame: &mut Frame, area: Rect, game: &Game<R>, ui: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(34)])
        .split(area);

    draw_ranks(frame, chunks[0], game, ui);
    draw_side_panel(frame, chunks[1], game, ui);
}

fn draw_ranks<R: Rng>(frame: &mut Frame, area: Rect, game: &Game<R>, ui: &UiState) {
    let views = game.map_view();
    let clickable = clickable_nodes(&views);
    let cursor_id = clickable.get(ui.map_cursor).copied();

    let mut lines = vec![Line::from("")];
    for rank in views.iter().filter(|r| r.visibility.is_shown()) {
        let mut spans = Vec::new();
        for node in &rank.nodes {
            if !spans.is_empty() {
                spans.push(Span::styled(" ── ", Style::default().fg(Color::DarkGray)));
            }
            let selected = cursor_id == Some(node.id) || game.pending_node() == Some(node.id);
            spans.push(node_span(node, rank.visibility, selected));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(Span::styled(
            "│",
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.pop();

    let map = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Map ")
            .border_style(Style::default().fg(Color::Green)),
    );
    frame.render_widget(map, area);
}

fn node_span(node: &NodeView, visibility: RankVisibility, selected: bool) -> Span<'static> {
    let token = if node.is_current { PLAYER_TOKEN } else { "" };
    let text = if visibility == RankVisibility::Obscured {
        format!("[{}]", node.label)
    } else {
        format!("[{}{} {}]", token, node.kind.icon(), node.label)
    };

    let mut style = match node.status {
        NodeStatus::Completed => Style::default().fg(Color::Green),
        NodeStatus::Available => Style::default().fg(Color::Yellow),
        NodeStatus::Locked => Style::default().fg(Color::DarkGray),
    };
    if visibility == RankVisibility::Obscured {
        style = Style::default().fg(Color::DarkGray);
    }
    if visibility == RankVisibility::Revealing {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if node.is_current {
        style = style.add_modifier(Modifier::BOLD);
    }
    if selected {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(text, style)
}

fn draw_side_panel<R: Rng>(frame: &mut Frame, area: Rect, game: &Game<R>, ui: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Selected node
            Constraint::Min(4),    // Inventory
            Constraint::Length(8), // Log
        ])
        .split(area);

    draw_scroll(frame, chunks[0], game);
    draw_inventory(frame, chunks[1], game);

    let log: Vec<Line> = ui.log.iter().map(|l| Line::from(l.as_str())).collect();
    frame.render_widget(
        Paragraph::new(log)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Journal ")),
        chunks[2],
    );
}

/// Description of the pending destination, like an unrolled scroll
fn draw_scroll<R: Rng>(frame: &mut Frame, area: Rect, game: &Game<R>) {
    let node = game
        .pending_node()
        .and_then(|id| game.state().world.as_ref()?.node(id));

    let lines = match node {
        Some(node) => {
            let desc = if node.description.is_empty() {
                "The path ahead is unclear..."
            } else {
                node.description.as_str()
            };
            vec![
                Line::from(Span::styled(
                    node.name.as_str(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(desc),
                Line::from(""),
                Line::from(Span::styled(
                    "[Enter] Go  [Esc] Back",
                    Style::default().fg(Color::DarkGray),
                )),
            ]
        }
        None => vec![
            Line::from("Choose a path."),
            Line::from(""),
            Line::from(Span::styled(
                "[←/→] Move  [Enter] Select",
                Style::default().fg(Color::DarkGray),
            )),
        ],
    };

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Scroll ")),
        area,
    );
}

fn draw_inventory<R: Rng>(frame: &mut Frame, area: Rect, game: &Game<R>) {
    let inventory = &game.state().player.inventory;
    let lines: Vec<Line> = if inventory.is_empty() {
        vec![Line::from(Span::styled(
            "Empty",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        inventory
            .iter()
            .enumerate()
            .map(|(i, item)| {
                Line::from(vec![
                    Span::styled(format!("[{}] ", i + 1), Style::default().fg(Color::Cyan)),
                    Span::raw(format!("{} (+{} HP)", item.name, item.hp)),
                ])
            })
            .collect()
    };

    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Items ")),
        area,
    );
}
