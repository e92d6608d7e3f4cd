//! Conversation pane: chat bubbles, the reply being streamed, and the
//! loading indicator.

use crate::events::{Role, Turn};
use crate::state::ChatState;
use crate::ui::conversation::streaming::streaming_lines;
use crate::ui::conversation::{HistoryLine, wrap_text};
use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
    },
};

/// Conversation history display component
pub struct ConversationHistory<'a> {
    state: &'a ChatState,
    tick: u64,
}

impl<'a> ConversationHistory<'a> {
    pub fn new(state: &'a ChatState, tick: u64) -> Self {
        Self { state, tick }
    }

    fn block() -> Block<'static> {
        Block::default().borders(Borders::ALL).title(" Conversation ")
    }

    /// All lines of the conversation laid out for `width` columns
    pub fn lines(&self, width: u16) -> Vec<HistoryLine> {
        let bubble_width = bubble_width(width);
        let mut all_lines = Vec::new();

        for turn in self.state.turns() {
            all_lines.extend(render_turn(turn, bubble_width));
            // spacing between messages
            all_lines.push(HistoryLine::left(Line::default()));
        }

        if self.state.is_loading() {
            let pending = self.state.pending_reply().unwrap_or_default();
            all_lines.extend(streaming_lines(pending, self.tick, bubble_width));
        }

        all_lines
    }

    /// Largest scroll offset that still shows a full pane
    pub fn max_scroll(&self, area: Rect) -> u16 {
        let inner = Self::block().inner(area);
        let total = self.lines(inner.width).len();
        total.saturating_sub(inner.height as usize).min(u16::MAX as usize) as u16
    }
}

fn bubble_width(width: u16) -> usize {
    let width = width as usize;
    (width * 3 / 4).max(10).min(width.max(1))
}

fn render_turn(turn: &Turn, width: usize) -> Vec<HistoryLine> {
    let timestamp = turn.sent_at().with_timezone(&Local).format("%H:%M");
    let header = format!("{} · {}", turn.role().label(), timestamp);
    let style = content_style(turn.role());

    let mut lines = Vec::new();
    let header = Line::from(vec![Span::styled(header, Style::default().fg(Color::DarkGray))]);
    lines.push(place(turn.role(), header));

    for text in wrap_text(turn.text(), width) {
        lines.push(place(turn.role(), Line::from(vec![Span::styled(text, style)])));
    }
    lines
}

fn place(role: Role, line: Line<'static>) -> HistoryLine {
    match role {
        Role::User => HistoryLine::right(line),
        Role::Bot => HistoryLine::left(line),
    }
}

fn content_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Cyan),
        Role::Bot => Style::default().fg(Color::Green),
    }
}

impl Widget for ConversationHistory<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Self::block();
        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.state.turns().is_empty() && !self.state.is_loading() {
            let welcome_lines = vec![
                Line::from(vec![Span::styled(
                    "Ask the coach anything about basketball.",
                    Style::default().fg(Color::Green),
                )]),
                Line::from(vec![Span::raw("")]),
                Line::from(vec![Span::styled(
                    "Press Enter to send, Esc to quit.",
                    Style::default().fg(Color::DarkGray),
                )]),
            ];

            for (i, line) in welcome_lines.iter().enumerate() {
                if i < inner_area.height as usize {
                    buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
                }
            }
            return;
        }

        let all_lines = self.lines(inner_area.width);

        // Window counted from the bottom; offset 0 pins the end in view
        let height = inner_area.height as usize;
        let total = all_lines.len();
        let max_offset = total.saturating_sub(height);
        let offset = (self.state.scroll_offset() as usize).min(max_offset);
        let start = max_offset - offset;
        let visible = &all_lines[start..total.min(start + height)];

        for (i, entry) in visible.iter().enumerate() {
            let line_width = (entry.line.width() as u16).min(inner_area.width);
            let x = if entry.right_aligned {
                inner_area.x + inner_area.width - line_width
            } else {
                inner_area.x
            };
            buf.set_line(x, inner_area.y + i as u16, &entry.line, line_width);
        }

        if max_offset > 0 {
            let mut scroll_state = ScrollbarState::new(max_offset).position(start);
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .render(area, buf, &mut scroll_state);
        }
    }
}
