#![forbid(unsafe_code)]

//! Query text state for ambi.
//!
//! This crate provides the in-memory structures a session edits:
//! - [`Trie`] - word store with occurrence counts and ranked prefix search
//! - [`LineEditor`] - the live query buffer
//! - [`History`] - submitted queries with a navigation cursor
//!
//! # Example
//! ```
//! use ambi_text::{History, LineEditor, Trie};
//! use ambi_core::event::InputEvent;
//!
//! let trie = Trie::with_vocabulary(["robot", "robber", "the"]);
//! assert_eq!(trie.query("rob"), "robber\trobot");
//!
//! let mut editor = LineEditor::new();
//! editor.apply(&InputEvent::Char('t'));
//! assert_eq!(editor.buffer(), "t");
//!
//! let mut history = History::new();
//! history.record("the");
//! assert_eq!(history.move_older(), Some("the"));
//! ```

pub mod history;
pub mod line_editor;
pub mod trie;

pub use history::History;
pub use line_editor::{EditOutcome, LineEditor};
pub use trie::{Completion, QUERY_DELIMITER, Trie};
