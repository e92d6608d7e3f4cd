use crate::state::Draft;
use crate::ui::conversation::commands::{SlashCommand, parse_slash_command};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Result returned when the user interacts with the conversation composer
#[derive(Debug, PartialEq)]
pub enum ConversationResult {
    /// Enter was pressed on a draft that is not a command
    Submit,
    /// Enter was pressed on a slash command; the draft has been cleared
    Command(SlashCommand),
    None,
}

/// Single-line input form for the draft
#[derive(Debug, Clone)]
pub struct ConversationComposer {
    placeholder: String,
    has_focus: bool,
}

impl ConversationComposer {
    pub fn new(placeholder: String) -> Self {
        Self {
            placeholder,
            has_focus: true,
        }
    }

    /// Handle key input against the draft
    pub fn handle_key(&self, draft: &mut Draft, key: KeyEvent) -> ConversationResult {
        if key.kind != KeyEventKind::Press {
            return ConversationResult::None;
        }

        match key.code {
            KeyCode::Enter => {
                if let Some(command) = parse_slash_command(draft.content()) {
                    draft.set("");
                    return ConversationResult::Command(command);
                }
                return ConversationResult::Submit;
            }
            KeyCode::Char(c) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL) {
                    draft.insert(c);
                }
            }
            KeyCode::Backspace => {
                draft.backspace();
            }
            KeyCode::Delete => {
                draft.delete();
            }
            KeyCode::Left => draft.move_left(),
            KeyCode::Right => draft.move_right(),
            KeyCode::Home => draft.move_home(),
            KeyCode::End => draft.move_end(),
            _ => {}
        }

        ConversationResult::None
    }

    /// Set focus state
    pub fn set_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
    }

    /// Terminal cursor position for the draft rendered in `area`
    pub fn cursor_position(&self, area: Rect, draft: &Draft) -> (u16, u16) {
        let inner = Self::block().inner(area);
        let (start, _) = visible_window(draft, inner.width as usize);
        let column = (draft.cursor() - start) as u16;
        (inner.x + column.min(inner.width.saturating_sub(1)), inner.y)
    }

    /// Widget for the composer over the current draft
    pub fn view<'a>(&'a self, draft: &'a Draft) -> ComposerView<'a> {
        ComposerView {
            composer: self,
            draft,
        }
    }

    fn block() -> Block<'static> {
        Block::default().borders(Borders::ALL).title(" Message ")
    }
}

/// First visible character and the visible text of a draft that may be wider
/// than the input box. The cursor always stays in view.
fn visible_window(draft: &Draft, width: usize) -> (usize, String) {
    if width == 0 {
        return (draft.cursor(), String::new());
    }
    let start = (draft.cursor() + 1).saturating_sub(width);
    let text = draft.content().chars().skip(start).take(width).collect();
    (start, text)
}

/// Rendering of the composer for one frame
pub struct ComposerView<'a> {
    composer: &'a ConversationComposer,
    draft: &'a Draft,
}

impl Widget for ComposerView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = ConversationComposer::block().style(if self.composer.has_focus {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        });

        let inner_area = block.inner(area);
        block.render(area, buf);

        let line = if self.draft.is_empty() {
            Line::from(vec![Span::styled(
                self.composer.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            )])
        } else {
            let (_, text) = visible_window(self.draft, inner_area.width as usize);
            Line::from(vec![Span::styled(text, Style::default().fg(Color::White))])
        };
        buf.set_line(inner_area.x, inner_area.y, &line, inner_area.width);
    }
}
