//! Conversation UI components for chat interface

pub mod commands;
pub mod composer;
pub mod history;
pub mod manager;
pub mod streaming;

pub use commands::{SlashCommand, get_help_text, parse_slash_command};
pub use composer::{ConversationComposer, ConversationResult};
pub use history::ConversationHistory;
pub use manager::{ConversationAction, ConversationManager};

use ratatui::text::Line;

/// A laid-out line of the conversation pane
#[derive(Debug, Clone)]
pub struct HistoryLine {
    pub line: Line<'static>,
    pub right_aligned: bool,
}

impl HistoryLine {
    pub fn left(line: Line<'static>) -> Self {
        Self {
            line,
            right_aligned: false,
        }
    }

    pub fn right(line: Line<'static>) -> Self {
        Self {
            line,
            right_aligned: true,
        }
    }

    /// Plain text of the line, styling dropped
    pub fn text(&self) -> String {
        self.line.spans.iter().map(|s| s.content.as_ref()).collect()
    }
}

/// Wrap text to fit within the given width.
///
/// Existing line breaks are kept, words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current_line = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current_line));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            if current_len > 0 && current_len + 1 + word.len() > width {
                lines.push(std::mem::take(&mut current_line));
                current_len = 0;
            }
            if current_len > 0 {
                current_line.push(' ');
                current_len += 1;
            }
            current_len += word.len();
            current_line.extend(word);
        }

        lines.push(current_line);
    }

    lines
}
