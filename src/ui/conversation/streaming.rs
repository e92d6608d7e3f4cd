use crate::ui::conversation::{HistoryLine, wrap_text};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

const DOT_FRAMES: [&str; 3] = ["●  ·  ·", "·  ●  ·", "·  ·  ●"];

/// Loading indicator frame for the given tick
pub fn loading_dots(tick: u64) -> &'static str {
    DOT_FRAMES[(tick % DOT_FRAMES.len() as u64) as usize]
}

/// Lines for a reply that is still arriving: whatever text has been received
/// so far, followed by the animated loading dots.
pub fn streaming_lines(pending: &str, tick: u64, width: usize) -> Vec<HistoryLine> {
    let mut lines = Vec::new();

    if !pending.trim().is_empty() {
        lines.push(HistoryLine::left(Line::from(vec![Span::styled(
            "Coach · typing",
            Style::default().fg(Color::DarkGray),
        )])));

        let content = wrap_text(pending.trim_start(), width);
        let last = content.len().saturating_sub(1);
        for (i, text) in content.into_iter().enumerate() {
            let mut spans = vec![Span::styled(text, Style::default().fg(Color::Green))];
            if i == last {
                spans.push(Span::styled("▋", Style::default().fg(Color::Yellow)));
            }
            lines.push(HistoryLine::left(Line::from(spans)));
        }
    }

    lines.push(HistoryLine::left(Line::from(vec![Span::styled(
        loading_dots(tick),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )])));

    lines
}
