#![forbid(unsafe_code)]

//! Logical input events.
//!
//! This module defines the event vocabulary produced by
//! [`crate::input_decoder::InputDecoder`] and consumed by the line editor and
//! the session. All events derive `Clone`, `PartialEq`, and `Eq` for use in
//! tests and pattern matching.
//!
//! # Design Notes
//!
//! - The three cancel-style control bytes (end-of-text, end-of-file, cancel)
//!   all collapse into a single [`InputEvent::Interrupt`].
//! - A framed escape sequence that matches no known key is surfaced as
//!   [`InputEvent::Unknown`] with its raw bytes rather than as an error.

/// Escape marker (`ESC`).
pub const ESCAPE: u8 = 0x1B;
/// Delete, sent by the Backspace key on most terminals.
pub const DELETE: u8 = 0x7F;
/// Backspace (`Ctrl+H`).
pub const BACKSPACE: u8 = 0x08;
/// Horizontal tab.
pub const TAB: u8 = 0x09;
/// Line feed, sent by Enter when the terminal translates CR.
pub const LINE_FEED: u8 = 0x0A;
/// Carriage return, sent by Enter in raw mode.
pub const CARRIAGE_RETURN: u8 = 0x0D;
/// End of text (`Ctrl+C`).
pub const END_OF_TEXT: u8 = 0x03;
/// End of transmission (`Ctrl+D`).
pub const END_OF_FILE: u8 = 0x04;
/// Cancel (`Ctrl+X`).
pub const CANCEL: u8 = 0x18;

/// Arrow up: `ESC [ A`.
pub const UP_ARROW: &[u8] = b"\x1b[A";
/// Arrow down: `ESC [ B`.
pub const DOWN_ARROW: &[u8] = b"\x1b[B";
/// Arrow right: `ESC [ C`.
pub const RIGHT_ARROW: &[u8] = b"\x1b[C";
/// Arrow left: `ESC [ D`.
pub const LEFT_ARROW: &[u8] = b"\x1b[D";

/// A logical key event decoded from raw terminal bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputEvent {
    /// A character that belongs in a query.
    Char(char),

    /// Remove the last character.
    Backspace,

    /// Request completions for the current buffer.
    Tab,

    /// Submit the current buffer.
    Enter,

    /// End-of-text, end-of-file, or cancel: stop the session.
    Interrupt,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Right arrow key.
    Right,

    /// Left arrow key.
    Left,

    /// A framed escape sequence that matched no known key.
    Unknown(Vec<u8>),

    /// A byte or character with no meaning for the editor.
    Ignored,
}

impl InputEvent {
    /// Map a framed escape sequence to an event.
    ///
    /// Both the CSI (`ESC [ x`) and SS3 (`ESC O x`) arrow encodings are
    /// recognized; anything else becomes [`InputEvent::Unknown`].
    #[must_use]
    pub fn from_sequence(bytes: Vec<u8>) -> Self {
        match bytes.as_slice() {
            [ESCAPE, b'[' | b'O', b'A'] => Self::Up,
            [ESCAPE, b'[' | b'O', b'B'] => Self::Down,
            [ESCAPE, b'[' | b'O', b'C'] => Self::Right,
            [ESCAPE, b'[' | b'O', b'D'] => Self::Left,
            _ => Self::Unknown(bytes),
        }
    }

    /// Whether this is one of the four arrow keys.
    #[must_use]
    pub const fn is_arrow(&self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Left | Self::Right)
    }

    /// Whether this is a specific character.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self, Self::Char(ch) if *ch == c)
    }
}

/// Whether a character is accepted into a query.
///
/// Alphanumerics plus the word punctuation `_` and `-`.
#[must_use]
pub fn is_query_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}
