#![forbid(unsafe_code)]

//! The live query buffer.
//!
//! [`LineEditor`] applies decoded [`InputEvent`]s to the text being typed and
//! reports an [`EditOutcome`] describing what the display has to do. The
//! editor itself never writes anything.
//!
//! The cursor always sits at the end of the buffer; horizontal arrows are
//! accepted and ignored.

use ambi_core::event::InputEvent;
use unicode_width::UnicodeWidthStr;

/// Effect of applying one event to a [`LineEditor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// A character was appended and should be echoed.
    Inserted(char),
    /// The last character was removed and should be erased from the display.
    Erased(char),
    /// Completion was requested for the (non-empty) buffer.
    Complete,
    /// The buffer was submitted and cleared.
    Submitted(String),
    /// The user asked to end the session.
    Interrupted,
    /// Nothing changed.
    Unchanged,
}

/// Editable single-line query buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditor {
    buffer: String,
}

impl LineEditor {
    /// Create an empty editor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current buffer contents.
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters (always the buffer length).
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.buffer.chars().count()
    }

    /// Terminal cells the buffer occupies.
    #[must_use]
    pub fn display_width(&self) -> usize {
        self.buffer.width()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Replace the whole buffer, e.g. with a recalled history entry.
    pub fn replace(&mut self, text: &str) {
        self.buffer.clear();
        self.buffer.push_str(text);
    }

    /// Empty the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Apply one event.
    ///
    /// History navigation (`Up`/`Down`) is not handled here and leaves the
    /// buffer [`Unchanged`](EditOutcome::Unchanged).
    pub fn apply(&mut self, event: &InputEvent) -> EditOutcome {
        match event {
            InputEvent::Char(c) => {
                self.buffer.push(*c);
                EditOutcome::Inserted(*c)
            }
            InputEvent::Backspace => match self.buffer.pop() {
                Some(c) => EditOutcome::Erased(c),
                None => EditOutcome::Unchanged,
            },
            InputEvent::Tab if !self.buffer.is_empty() => EditOutcome::Complete,
            InputEvent::Enter => EditOutcome::Submitted(std::mem::take(&mut self.buffer)),
            InputEvent::Interrupt => EditOutcome::Interrupted,
            InputEvent::Tab
            | InputEvent::Up
            | InputEvent::Down
            | InputEvent::Left
            | InputEvent::Right
            | InputEvent::Unknown(_)
            | InputEvent::Ignored => EditOutcome::Unchanged,
        }
    }
}
