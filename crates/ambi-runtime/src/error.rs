#![forbid(unsafe_code)]

//! Session errors.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::session::SessionState;

/// Result alias for session operations.
pub type Result<T, E = SessionError> = std::result::Result<T, E>;

/// Failure of a [`TerminalSession`](crate::session::TerminalSession) lifecycle step.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// `start` was called on a session that is not idle.
    #[error("session already started (state: {0:?})")]
    AlreadyStarted(SessionState),
    /// The terminal mode could not be entered.
    #[error("failed to enter terminal mode: {0}")]
    EnterMode(#[source] io::Error),
    /// The input thread could not be spawned.
    #[error("failed to spawn input thread: {0}")]
    Spawn(#[source] io::Error),
    /// The input thread panicked; the session state is lost.
    #[error("input thread panicked")]
    WorkerPanicked,
    /// The terminal mode could not be restored.
    #[error("failed to restore terminal mode: {0}")]
    Teardown(#[source] io::Error),
}
