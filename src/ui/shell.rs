use crate::ui::conversation::{ConversationManager, get_help_text};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Page shell: the title on top, the query form below, a status line last.
pub fn render(frame: &mut Frame, title: &str, manager: &mut ConversationManager) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(6),    // Conversation + composer
            Constraint::Length(1), // Status
        ])
        .split(frame.size());

    let heading = Paragraph::new(Line::from(vec![Span::styled(
        title.to_string(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(heading, chunks[0]);

    manager.render(frame, chunks[1]);
    render_status(frame, chunks[2], manager);
}

fn render_status(frame: &mut Frame, area: Rect, manager: &ConversationManager) {
    let line = match manager.state().notice() {
        Some(notice) => Line::from(vec![Span::styled(
            notice.to_string(),
            Style::default().fg(Color::Red),
        )]),
        None if manager.help_visible() => Line::from(vec![Span::styled(
            get_help_text(),
            Style::default().fg(Color::Gray),
        )]),
        None => Line::from(vec![
            Span::styled(
                "Enter send · /help · Esc quit",
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  "),
            Span::styled(
                manager.endpoint().to_string(),
                Style::default().fg(Color::Blue),
            ),
        ]),
    };
    frame.render_widget(Paragraph::new(line), area);
}
