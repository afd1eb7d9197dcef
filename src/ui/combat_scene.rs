use super::game_common::hp_color;
use super::UiState;
use knight_quiz::combat::{Combat, CombatPhase, QteState};
use knight_quiz::core::constants::QTE_CURSOR_MAX;
use knight_quiz::core::GameState;
use knight_quiz::world::AnswerKind;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

/// Draws the battle: enemy, question, answer options, timer and block bar
pub fn draw_combat_scene(frame: &mut Frame, area: Rect, state: &GameState, ui: &UiState) {
    let Some(combat) = state.combat.as_ref() else {
        return;
    };

    let border_color = if ui.flash_ms > 0 {
        Color::Red
    } else if combat.is_boss {
        Color::Magenta
    } else {
        Color::White
    };
    let combat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Battle ");

    let inner = combat_block.inner(area);
    frame.render_widget(combat_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Enemy
            Constraint::Length(1), // Turn indicator
            Constraint::Min(6),    // Question + answers
            Constraint::Length(3), // Timer or block bar
        ])
        .split(inner);

    draw_enemy(frame, chunks[0], combat, ui);
    draw_turn_indicator(frame, chunks[1], combat);
    draw_question(frame, chunks[2], combat, ui);

    match (&combat.phase, combat.qte.as_ref()) {
        (CombatPhase::Qte, Some(qte)) => draw_qte_bar(frame, chunks[3], qte),
        _ => draw_timer(frame, chunks[3], combat),
    }
}

fn draw_enemy(frame: &mut Frame, area: Rect, combat: &Combat, ui: &UiState) {
    let enemy = &combat.enemy;
    let ratio = if enemy.max_hp > 0 {
        (enemy.current_hp.max(0) as f64 / enemy.max_hp as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    // Shake by nudging the title sideways
    let offset = if ui.shake_ms > 0 && (ui.shake_ms / 50) % 2 == 0 {
        "  "
    } else {
        ""
    };
    let title = format!(" {}{} ({}) ", offset, enemy.name, enemy.icon);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .gauge_style(
            Style::default()
                .fg(hp_color(ratio))
                .add_modifier(Modifier::BOLD),
        )
        .label(format!("HP: {}/{}", enemy.current_hp.max(0), enemy.max_hp))
        .ratio(ratio);
    frame.render_widget(gauge, area);
}

fn draw_turn_indicator(frame: &mut Frame, area: Rect, combat: &Combat) {
    let (text, color) = match combat.phase {
        CombatPhase::PlayerTurn | CombatPhase::Resolving(_) => ("YOUR TURN", Color::Cyan),
        CombatPhase::EnemyTurn => ("ENEMY TURN", Color::Red),
        CombatPhase::Qte => ("BLOCK! [Space]", Color::Red),
        CombatPhase::QteSettling => ("ENEMY TURN", Color::Red),
        CombatPhase::Victory => ("VICTORY", Color::Green),
        CombatPhase::Defeat => ("DEFEAT", Color::Red),
    };
    frame.render_widget(
        Paragraph::new(Span::styled(
            text,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        area,
    );
}

fn draw_question(frame: &mut Frame, area: Rect, combat: &Combat, ui: &UiState) {
    let Some(question) = combat.current_question.as_ref() else {
        frame.render_widget(
            Paragraph::new("The enemy stares silently...").alignment(Alignment::Center),
            area,
        );
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            question.text.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    match &question.kind {
        AnswerKind::MultipleChoice { answers, .. } => {
            for (i, answer) in answers.iter().enumerate() {
                let line = if combat.is_option_enabled(i) {
                    Line::from(vec![
                        Span::styled(format!("[{}] ", i + 1), Style::default().fg(Color::Cyan)),
                        Span::raw(answer.as_str()),
                    ])
                } else {
                    Line::from(Span::styled(
                        format!("[{}] {}", i + 1, answer),
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::CROSSED_OUT),
                    ))
                };
                lines.push(line);
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "[1-4] Answer  [H] Hint",
                Style::default().fg(Color::DarkGray),
            )));
        }
        AnswerKind::FreeText { .. } => {
            lines.push(Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Cyan)),
                Span::raw(ui.input_buffer.as_str()),
                Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Type your answer, [Enter] Submit",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Question ")),
        area,
    );
}

fn draw_timer(frame: &mut Frame, area: Rect, combat: &Combat) {
    let percent = combat.timer_percent().unwrap_or(100.0);
    let ratio = (percent / 100.0).clamp(0.0, 1.0);
    let seconds = combat
        .turn_timer
        .map(|t| t.remaining_ms() as f64 / 1000.0)
        .unwrap_or(0.0);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Time "))
        .gauge_style(Style::default().fg(hp_color(ratio)))
        .label(format!("{:.1}s", seconds))
        .ratio(ratio);
    frame.render_widget(gauge, area);
}

/// Renders the block bar: target zone and the sweeping cursor.
fn draw_qte_bar(frame: &mut Frame, area: Rect, qte: &QteState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Block ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width.max(1) as usize;
    let to_col = |percent: f64| -> usize {
        ((percent / (QTE_CURSOR_MAX + 2.0)) * width as f64).floor() as usize
    };
    let zone_start = to_col(qte.target_start);
    let zone_end = to_col(qte.target_end()).min(width - 1);
    let cursor = to_col(qte.position).min(width - 1);

    let spans: Vec<Span> = (0..width)
        .map(|col| {
            if col == cursor {
                Span::styled(
                    "▼",
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
            } else if (zone_start..=zone_end).contains(&col) {
                Span::styled("█", Style::default().fg(Color::Green))
            } else {
                Span::styled("─", Style::default().fg(Color::DarkGray))
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}
