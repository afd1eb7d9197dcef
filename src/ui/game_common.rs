//! Shared UI helpers.

use super::Feedback;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Green/yellow/red by remaining fraction
pub fn hp_color(ratio: f64) -> Color {
    if ratio > 0.66 {
        Color::Green
    } else if ratio > 0.33 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// A rectangle of the given size centered in `area`, clamped to fit.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Floating feedback text ("Correct!", "BLOCKED!") near the top of `area`.
pub fn render_feedback_banner(frame: &mut Frame, area: Rect, feedback: &Feedback) {
    let color = if feedback.success {
        Color::Green
    } else {
        Color::Red
    };
    let width = (feedback.text.chars().count() as u16 + 6).min(area.width);
    let banner = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + 1,
        width,
        3.min(area.height),
    );

    frame.render_widget(Clear, banner);
    let text = Paragraph::new(Line::from(Span::styled(
        feedback.text.as_str(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );
    frame.render_widget(text, banner);
}

/// Full-area overlay with a title, a message and a key prompt.
pub fn render_overlay(
    frame: &mut Frame,
    area: Rect,
    color: Color,
    title: &str,
    message: &str,
    prompt: &str,
) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let content_height: u16 = 5;
    let y_offset = inner.y + inner.height.saturating_sub(content_height) / 2;

    let lines = vec![
        Line::from(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(Span::styled(prompt, Style::default().fg(Color::DarkGray))),
    ];

    let text = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(
        text,
        Rect::new(
            inner.x,
            y_offset,
            inner.width,
            content_height.min(inner.height),
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_clamps() {
        let area = Rect::new(0, 0, 10, 4);
        assert_eq!(centered_rect(4, 2, area), Rect::new(3, 1, 4, 2));
        assert_eq!(centered_rect(40, 20, area), area);
    }

    #[test]
    fn test_hp_color_thresholds() {
        assert_eq!(hp_color(1.0), Color::Green);
        assert_eq!(hp_color(0.5), Color::Yellow);
        assert_eq!(hp_color(0.1), Color::Red);
    }
}
