use crate::client::QueryClient;
use crate::config::Config;
use crate::error::QueryError;
use crate::events::QueryEvent;
use crate::state::{ChatState, SubmitRejected};
use crate::ui::conversation::{
    ConversationComposer, ConversationHistory, ConversationResult, SlashCommand,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

const SCROLL_STEP: u16 = 5;

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationAction {
    None,
    Exit,
}

/// The query form: owns the chat state and the in-flight request
pub struct ConversationManager {
    state: ChatState,
    composer: ConversationComposer,
    client: QueryClient,
    stream_receiver: Option<mpsc::UnboundedReceiver<QueryEvent>>,
    /// Key bindings shown in the status line until the next key press
    help_visible: bool,
    tick: u64,
}

impl ConversationManager {
    pub fn new(config: &Config) -> Result<Self, QueryError> {
        Ok(Self {
            state: ChatState::new(),
            composer: ConversationComposer::new(config.ui.placeholder.clone()),
            client: QueryClient::new(&config.endpoint)?,
            stream_receiver: None,
            help_visible: false,
            tick: 0,
        })
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn endpoint(&self) -> &str {
        self.client.url()
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    /// Submit the current draft. Returns whether a request was started.
    pub fn submit(&mut self) -> bool {
        match self.state.submit_start() {
            Ok(query) => {
                self.stream_receiver = Some(self.client.spawn_query(query));
                true
            }
            Err(SubmitRejected::Empty) => false,
            Err(SubmitRejected::Busy) => {
                log::debug!("submit ignored, a reply is still on its way");
                false
            }
        }
    }

    /// Drain query events without blocking (called from the main loop)
    pub fn process_query_events(&mut self) {
        let Some(stream_rx) = self.stream_receiver.as_mut() else {
            return;
        };

        let mut finished = false;
        loop {
            match stream_rx.try_recv() {
                Ok(QueryEvent::Fragment(fragment)) => {
                    self.state.chunk_received(&fragment);
                }
                Ok(QueryEvent::Completed(reply)) => {
                    self.state.submit_success(reply);
                    finished = true;
                    break;
                }
                Ok(QueryEvent::Failed(_)) => {
                    // cause already logged by the query task
                    self.state.submit_failure();
                    finished = true;
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::error!("query task ended without a result");
                    self.state.submit_failure();
                    finished = true;
                    break;
                }
            }
        }

        if finished {
            self.stream_receiver = None;
        }
    }

    /// Advance animations
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        if key.kind != KeyEventKind::Press {
            return ConversationAction::None;
        }
        self.help_visible = false;

        match key.code {
            KeyCode::Esc => return ConversationAction::Exit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return ConversationAction::Exit;
            }
            KeyCode::PageUp => {
                self.state.scroll_up(SCROLL_STEP);
                return ConversationAction::None;
            }
            KeyCode::PageDown => {
                self.state.scroll_down(SCROLL_STEP);
                return ConversationAction::None;
            }
            _ => {}
        }

        match self.composer.handle_key(self.state.draft_mut(), key) {
            ConversationResult::Submit => {
                self.submit();
                ConversationAction::None
            }
            ConversationResult::Command(command) => self.handle_slash_command(command),
            ConversationResult::None => ConversationAction::None,
        }
    }

    fn handle_slash_command(&mut self, command: SlashCommand) -> ConversationAction {
        match command {
            SlashCommand::Quit => ConversationAction::Exit,
            SlashCommand::Help => {
                self.help_visible = true;
                ConversationAction::None
            }
        }
    }

    /// Render the conversation pane and the composer
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // History
                Constraint::Length(3), // Composer
            ])
            .split(area);

        // dimmed while a reply is on its way; Enter is ignored until then
        self.composer.set_focus(!self.state.is_loading());

        let max_scroll = ConversationHistory::new(&self.state, self.tick).max_scroll(chunks[0]);
        self.state.clamp_scroll(max_scroll);

        frame.render_widget(ConversationHistory::new(&self.state, self.tick), chunks[0]);
        frame.render_widget(self.composer.view(self.state.draft()), chunks[1]);

        let (x, y) = self.composer.cursor_position(chunks[1], self.state.draft());
        frame.set_cursor(x, y);
    }
}
