#![forbid(unsafe_code)]

//! ambi public facade crate.
//!
//! This crate provides the surface area for users: it re-exports the common
//! types from the internal crates and offers a prelude.
//!
//! ```
//! use ambi::prelude::*;
//!
//! let trie = Trie::with_vocabulary(["robot", "robber"]);
//! assert_eq!(trie.query("rob"), "robber\trobot");
//! ```

// --- Core re-exports -------------------------------------------------------

pub use ambi_core::event::InputEvent;
pub use ambi_core::input_decoder::{DEFAULT_MAX_SEQUENCE_LEN, InputDecoder};
pub use ambi_core::terminal_mode::{ModeGuard, RawMode, TerminalMode};

// --- Text re-exports -------------------------------------------------------

pub use ambi_text::{Completion, EditOutcome, History, LineEditor, QUERY_DELIMITER, Trie};

// --- Runtime re-exports ----------------------------------------------------

pub use ambi_runtime::{
    ConfigError, PromptRenderer, SessionConfig, SessionCore, SessionError, SessionState,
    ShutdownSignal, TerminalSession,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for ambi programs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Session lifecycle failure.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// Rejected configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Standard result type for ambi APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Completion, EditOutcome, Error, History, InputEvent, LineEditor, RawMode, Result,
        SessionConfig, SessionState, TerminalMode, TerminalSession, Trie,
    };

    pub use crate::{core, runtime, text};
}

pub use ambi_core as core;
pub use ambi_runtime as runtime;
pub use ambi_text as text;
