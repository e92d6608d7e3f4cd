//! Conversation form state and its transitions.
//!
//! Fields change only through `submit_start`, `chunk_received`,
//! `submit_success` and `submit_failure`, plus the draft editing and
//! scrolling helpers. Every transition that changes the turns or the loading
//! flag pins the view back to the end of the conversation.

use crate::error::GENERIC_FAILURE;
use crate::events::Turn;

/// Why a submit was not started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    /// Draft was empty
    Empty,
    /// A previous submit is still waiting for its reply
    Busy,
}

/// Draft text with a character-based cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    content: String,
    cursor: usize,
}

impl Draft {
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Cursor position, in characters
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn len_chars(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    pub fn set(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.len_chars();
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.content.remove(at);
        true
    }

    /// Delete the character under the cursor
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.len_chars() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.content.remove(at);
        true
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len_chars());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len_chars();
    }

    fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.content)
    }
}

/// Everything the query form owns
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    draft: Draft,
    turns: Vec<Turn>,
    loading: bool,
    /// Partial reply while a streamed answer is arriving
    pending: Option<String>,
    /// Failure notice of the last submit
    notice: Option<String>,
    /// Lines scrolled up from the end of the conversation
    scroll_offset: u16,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn pending_reply(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn scroll_offset(&self) -> u16 {
        self.scroll_offset
    }

    /// Start a submit: append the user turn, clear the draft, raise the
    /// loading flag, and return the query to send.
    pub fn submit_start(&mut self) -> Result<String, SubmitRejected> {
        if self.draft.is_empty() {
            return Err(SubmitRejected::Empty);
        }
        if self.loading {
            return Err(SubmitRejected::Busy);
        }

        let query = self.draft.take();
        self.turns.push(Turn::user(query.clone()));
        self.loading = true;
        self.pending = Some(String::new());
        self.notice = None;
        self.follow_tail();
        Ok(query)
    }

    /// A fragment of the streamed reply arrived
    pub fn chunk_received(&mut self, fragment: &str) {
        if !self.loading {
            return;
        }
        self.pending.get_or_insert_with(String::new).push_str(fragment);
        self.follow_tail();
    }

    /// The reply is complete
    pub fn submit_success(&mut self, reply: String) {
        self.turns.push(Turn::bot(reply));
        self.finish_request();
    }

    /// The request failed. The conversation is left untouched.
    pub fn submit_failure(&mut self) {
        self.notice = Some(GENERIC_FAILURE.to_string());
        self.finish_request();
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Clamp the scroll offset to what the view can actually show
    pub fn clamp_scroll(&mut self, max_offset: u16) {
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    fn finish_request(&mut self) {
        self.loading = false;
        self.pending = None;
        self.follow_tail();
    }

    fn follow_tail(&mut self) {
        self.scroll_offset = 0;
    }
}
