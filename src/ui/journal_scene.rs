use super::game_common::centered_rect;
use knight_quiz::world::Lesson;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Draws an open journal page for a lesson node
pub fn draw_journal(frame: &mut Frame, area: Rect, lesson: &Lesson, page: usize) {
    let journal_area = centered_rect(70, 18, area);
    frame.render_widget(Clear, journal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!(" {} ", lesson.title));
    let inner = block.inner(journal_area);
    frame.render_widget(block, journal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    let total = lesson.pages.len().max(1);
    let text = lesson.pages.get(page).map(String::as_str).unwrap_or("");
    frame.render_widget(
        Paragraph::new(text).wrap(Wrap { trim: true }),
        chunks[0],
    );

    let footer = Line::from(vec![
        Span::styled(
            format!("Page {}/{}", page + 1, total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "  [←/→] Flip  [Enter] Close",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(footer).alignment(Alignment::Center),
        chunks[1],
    );
}
