#![forbid(unsafe_code)]

//! Terminal mode lifecycle guard.
//!
//! This module provides RAII-based management of the terminal input mode so
//! the user's shell is restored even when the program panics.
//!
//! # Lifecycle Guarantees
//!
//! 1. **Acquire once** - [`ModeGuard::acquire`] enters the mode and holds it.
//!    A failed enter is followed by a `leave` before the error is returned.
//!
//! 2. **Release exactly once** - [`ModeGuard::release`] leaves the mode and
//!    marks the guard inactive; later calls and the eventual drop do nothing.
//!
//! 3. **Drop restores** - a guard dropped while still active leaves the mode,
//!    so return, `?`, and panic unwinding (unless `panic = "abort"`) all
//!    restore the terminal.
//!
//! 4. **Panic and signal safety for raw mode** - [`RawMode`] installs a panic
//!    hook and a signal thread that restore the terminal before the process
//!    goes away.
//!
//! # Usage
//!
//! ```no_run
//! use ambi_core::terminal_mode::{ModeGuard, RawMode};
//!
//! let mut guard = ModeGuard::acquire(RawMode::new())?;
//! // Terminal now delivers bytes unbuffered and unechoed.
//! guard.release()?;
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, Write};
use std::sync::OnceLock;

#[cfg(unix)]
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// A terminal input mode that can be entered and left.
///
/// Implementations must tolerate `leave` being called after a failed or
/// partial `enter`.
pub trait TerminalMode: Send + 'static {
    /// Switch the terminal into this mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be reconfigured.
    fn enter(&mut self) -> io::Result<()>;

    /// Restore the terminal to the state it had before `enter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the previous configuration cannot be restored.
    fn leave(&mut self) -> io::Result<()>;
}

/// Holds a [`TerminalMode`] for as long as the guard is active.
#[derive(Debug)]
pub struct ModeGuard<M: TerminalMode> {
    mode: M,
    active: bool,
}

impl<M: TerminalMode> ModeGuard<M> {
    /// Enter `mode` and return a guard that leaves it on release or drop.
    ///
    /// # Errors
    ///
    /// Returns the error from [`TerminalMode::enter`]. The mode is left
    /// before returning, since a failed enter may have changed the terminal.
    pub fn acquire(mut mode: M) -> io::Result<Self> {
        if let Err(err) = mode.enter() {
            if let Err(leave_err) = mode.leave() {
                tracing::error!(%leave_err, "failed to restore terminal mode after failed enter");
            }
            return Err(err);
        }
        tracing::info!("terminal mode entered");
        Ok(Self { mode, active: true })
    }

    /// Whether the mode is still held.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Leave the mode now. Subsequent calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns the error from [`TerminalMode::leave`]. The guard is inactive
    /// afterwards either way; restoring is never retried.
    pub fn release(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.mode.leave()?;
        tracing::info!("terminal mode restored");
        Ok(())
    }
}

impl<M: TerminalMode> Drop for ModeGuard<M> {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            tracing::error!(%err, "failed to restore terminal mode");
        }
    }
}

/// Crossterm raw mode.
///
/// Entering also installs a process-wide panic hook and, on Unix, a signal
/// thread for `SIGINT`, `SIGTERM` and `SIGHUP`; both restore the terminal
/// before the process exits.
#[derive(Debug, Default)]
pub struct RawMode {
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl RawMode {
    /// Create a raw mode handle (nothing happens until `enter`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TerminalMode for RawMode {
    fn enter(&mut self) -> io::Result<()> {
        install_panic_hook();
        crossterm::terminal::enable_raw_mode()?;
        tracing::debug!("terminal raw mode enabled");
        #[cfg(unix)]
        {
            self.signal_guard = Some(SignalGuard::new()?);
        }
        Ok(())
    }

    fn leave(&mut self) -> io::Result<()> {
        #[cfg(unix)]
        let _ = self.signal_guard.take();

        crossterm::terminal::disable_raw_mode()?;
        tracing::debug!("terminal raw mode disabled");
        io::stdout().flush()
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.write_all(crate::ansi::CRLF);
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::Builder::new()
            .name("ambi-signals".into())
            .spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    tracing::warn!(signal, "termination signal received, restoring terminal");
                    best_effort_cleanup();
                    std::process::exit(128 + signal);
                }
            })?;
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
