#![forbid(unsafe_code)]

//! ambi runtime
//!
//! This crate ties the decoder from `ambi-core` and the text state from
//! `ambi-text` into an interactive completion prompt.
//!
//! # Key Components
//!
//! - [`TerminalSession`] - owns the terminal mode and the input thread
//! - [`SessionCore`] - trie, editor, history and display moved into that thread
//! - [`SessionConfig`] - prompt, vocabulary and decoder settings
//! - [`PromptRenderer`] - prompt line and completion output
//! - [`ShutdownSignal`] - cooperative stop request shared across threads
//!
//! # Role in ambi
//! `ambi-runtime` is the orchestrator: bytes come in from the input source,
//! events come out of the decoder, the editor and history consume them, and
//! the renderer writes the result to the display.

pub mod config;
pub mod error;
pub mod prompt;
pub mod session;
pub mod shutdown;

pub use config::{ConfigError, SessionConfig};
pub use error::SessionError;
pub use prompt::PromptRenderer;
pub use session::{Flow, SessionCore, SessionState, SubmitHandler, TerminalSession};
pub use shutdown::ShutdownSignal;
