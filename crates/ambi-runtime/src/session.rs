#![forbid(unsafe_code)]

//! Terminal session orchestration.
//!
//! A [`TerminalSession`] owns everything an interactive completion prompt
//! needs: the trie, the line editor, the history, the prompt renderer, and the
//! terminal mode. Starting it enters the mode and moves the editing state
//! into an input thread (`ambi-input`) that reads one byte at a time, decodes
//! it, and applies the resulting event. Stopping joins that thread, takes the
//! state back, and restores the terminal.
//!
//! # State machine
//!
//! ```text
//! Idle --start--> Running --interrupt / EOF / stop--> ShuttingDown --join--> Stopped
//!   \----------------------------stop-------------------------------------->/
//! ```
//!
//! # Invariants
//!
//! 1. The terminal mode is entered at most once and left exactly once after a
//!    successful enter, whichever way the session ends (including drop).
//! 2. Only the input thread touches the trie, buffer and history while
//!    running; the supervisor only sees them again after the join.
//! 3. Events are applied strictly in read order.
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use ambi_core::terminal_mode::TerminalMode;
//! use ambi_runtime::config::SessionConfig;
//! use ambi_runtime::session::{SessionState, TerminalSession};
//!
//! struct Cooked;
//! impl TerminalMode for Cooked {
//!     fn enter(&mut self) -> std::io::Result<()> { Ok(()) }
//!     fn leave(&mut self) -> std::io::Result<()> { Ok(()) }
//! }
//!
//! let config = SessionConfig::default()
//!     .with_vocabulary(["robot", "robber"])
//!     .with_styled(false);
//! let mut session = TerminalSession::new(config, Vec::new(), Cooked)?;
//! session.run(Cursor::new(b"rob\t\x03".to_vec()))?;
//!
//! assert_eq!(session.state(), SessionState::Stopped);
//! let output = String::from_utf8_lossy(session.core().unwrap().writer()).into_owned();
//! assert!(output.contains("robber\trobot"));
//! # Ok::<(), ambi_runtime::error::SessionError>(())
//! ```

use std::fmt;
use std::io::{self, BufReader, Read, Write};
use std::thread::{self, JoinHandle};

use ambi_core::event::InputEvent;
use ambi_core::input_decoder::InputDecoder;
use ambi_core::terminal_mode::{ModeGuard, TerminalMode};
use ambi_text::{EditOutcome, History, LineEditor, Trie};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::prompt::PromptRenderer;
use crate::shutdown::ShutdownSignal;

/// Name of the input thread.
pub const INPUT_THREAD_NAME: &str = "ambi-input";

/// Consumer invoked with every submitted query.
pub type SubmitHandler = Box<dyn FnMut(&str) + Send>;

/// Lifecycle state of a [`TerminalSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Built, not started.
    Idle,
    /// The input thread is running.
    Running,
    /// Shutdown was requested; the input thread has not been joined yet.
    ShuttingDown,
    /// Finished; the terminal mode has been released.
    Stopped,
}

/// Whether the read loop keeps going after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next byte.
    Continue,
    /// Leave the read loop.
    Stop,
}

/// The editing state a session moves between threads.
pub struct SessionCore<W> {
    trie: Trie,
    decoder: InputDecoder,
    editor: LineEditor,
    history: History,
    renderer: PromptRenderer,
    writer: W,
    learn_submissions: bool,
    on_submit: SubmitHandler,
}

impl<W> fmt::Debug for SessionCore<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCore")
            .field("words", &self.trie.len())
            .field("buffer", &self.editor.buffer())
            .field("history", &self.history.len())
            .field("learn_submissions", &self.learn_submissions)
            .field("on_submit", &"<dyn FnMut(&str)>")
            .finish_non_exhaustive()
    }
}

impl<W: Write> SessionCore<W> {
    /// Build the editing state for `config`, writing to `writer`.
    ///
    /// The configuration is taken as already validated.
    pub fn new(config: &SessionConfig, writer: W) -> Self {
        Self {
            trie: Trie::with_vocabulary(&config.vocabulary),
            decoder: InputDecoder::with_max_sequence_len(config.max_sequence_len),
            editor: LineEditor::new(),
            history: History::new(),
            renderer: PromptRenderer::new(config.prompt.as_str(), config.styled),
            writer,
            learn_submissions: config.learn_submissions,
            on_submit: Box::new(|_: &str| {}),
        }
    }

    /// The word store.
    #[must_use]
    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    /// The live query buffer.
    #[must_use]
    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    /// Submitted queries.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The display sink.
    #[must_use]
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Replace the submission consumer.
    pub fn set_on_submit(&mut self, on_submit: SubmitHandler) {
        self.on_submit = on_submit;
    }

    /// Draw the prompt unless it is already current.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn render_prompt(&mut self) -> io::Result<()> {
        self.renderer
            .render(&mut self.writer, self.editor.buffer())
            .map(drop)
    }

    /// Decode one input byte and apply the event it completes, if any.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn handle_byte(&mut self, byte: u8) -> io::Result<Flow> {
        match self.decoder.decode(byte) {
            Some(event) => self.dispatch(event),
            None => Ok(Flow::Continue),
        }
    }

    /// Apply one decoded event.
    ///
    /// Vertical arrows go to the history; everything else to the editor.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn dispatch(&mut self, event: InputEvent) -> io::Result<Flow> {
        match event {
            InputEvent::Up => {
                let entry = self.history.move_older().map(str::to_owned);
                self.recall(entry);
                Ok(Flow::Continue)
            }
            InputEvent::Down => {
                let entry = self.history.move_newer().map(str::to_owned);
                self.recall(entry);
                Ok(Flow::Continue)
            }
            InputEvent::Unknown(_) => Ok(Flow::Continue),
            event => self.edit(&event),
        }
    }

    fn recall(&mut self, entry: Option<String>) {
        match entry {
            Some(text) => {
                tracing::debug!(index = self.history.index(), "history recall");
                self.editor.replace(&text);
                self.renderer.invalidate();
            }
            None => tracing::trace!("history boundary"),
        }
    }

    fn edit(&mut self, event: &InputEvent) -> io::Result<Flow> {
        match self.editor.apply(event) {
            EditOutcome::Inserted(c) => self.renderer.echo(&mut self.writer, c)?,
            EditOutcome::Erased(c) => self.renderer.erase(&mut self.writer, c)?,
            EditOutcome::Complete => {
                let prefix = self.editor.buffer();
                let results = self.trie.query(prefix);
                tracing::debug!(prefix, results = %results, "completion");
                self.renderer.show_results(&mut self.writer, &results)?;
            }
            EditOutcome::Submitted(text) => {
                self.renderer.submit(&mut self.writer)?;
                self.submit(&text);
            }
            EditOutcome::Interrupted => {
                tracing::debug!("interrupt received");
                return Ok(Flow::Stop);
            }
            EditOutcome::Unchanged => return Ok(Flow::Continue),
        }
        self.writer.flush()?;
        Ok(Flow::Continue)
    }

    fn submit(&mut self, text: &str) {
        if !text.is_empty() {
            if self.learn_submissions {
                self.trie.insert(text);
            }
            self.history.record(text);
        }
        tracing::debug!(query = text, "query submitted");
        (self.on_submit)(text);
    }

    /// Drain the decoder and end the prompt line.
    fn finish(&mut self) {
        if let Some(event) = self.decoder.flush()
            && let Err(err) = self.dispatch(event)
        {
            tracing::warn!(%err, "failed to apply trailing input");
        }
        let ended = ambi_core::ansi::newline(&mut self.writer).and_then(|()| self.writer.flush());
        if let Err(err) = ended {
            tracing::warn!(%err, "failed to end prompt line");
        }
    }
}

/// Triggers the signal when dropped, so a panicking read loop still wakes
/// the supervisor.
struct TriggerOnDrop(ShutdownSignal);

impl Drop for TriggerOnDrop {
    fn drop(&mut self) {
        self.0.trigger();
    }
}

/// Body of the input thread.
fn read_loop<W: Write, R: Read>(
    mut core: SessionCore<W>,
    input: R,
    shutdown: ShutdownSignal,
) -> SessionCore<W> {
    let _trigger = TriggerOnDrop(shutdown.clone());
    let mut bytes = BufReader::new(input).bytes();

    let reason = loop {
        if shutdown.is_triggered() {
            break "shutdown requested";
        }
        if let Err(err) = core.render_prompt() {
            tracing::warn!(%err, "prompt write failed");
            break "write error";
        }
        let byte = match bytes.next() {
            None => break "end of input",
            Some(Ok(byte)) => byte,
            Some(Err(err)) if err.kind() == io::ErrorKind::Interrupted => continue,
            Some(Err(err)) => {
                tracing::warn!(%err, "input read failed");
                break "read error";
            }
        };
        match core.handle_byte(byte) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Stop) => break "interrupt",
            Err(err) => {
                tracing::warn!(%err, "display write failed");
                break "write error";
            }
        }
    };

    core.finish();
    tracing::info!(reason, "input loop finished");
    core
}

/// An interactive completion prompt bound to a terminal.
///
/// `W` is the display sink and `M` the terminal mode held while running.
pub struct TerminalSession<W, M: TerminalMode> {
    state: SessionState,
    core: Option<SessionCore<W>>,
    worker: Option<JoinHandle<SessionCore<W>>>,
    mode: Option<M>,
    guard: Option<ModeGuard<M>>,
    shutdown: ShutdownSignal,
}

impl<W, M: TerminalMode> fmt::Debug for TerminalSession<W, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalSession")
            .field("state", &self.state)
            .field("core", &self.core)
            .field("worker", &self.worker.is_some())
            .field("mode_held", &self.guard.is_some())
            .field("shutdown", &self.shutdown.is_triggered())
            .finish()
    }
}

impl<W, M> TerminalSession<W, M>
where
    W: Write + Send + 'static,
    M: TerminalMode,
{
    /// Validate `config` and build an idle session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if the configuration is invalid.
    pub fn new(config: SessionConfig, writer: W, mode: M) -> Result<Self> {
        config.validate()?;
        tracing::debug!(
            words = config.vocabulary.len(),
            max_sequence_len = config.max_sequence_len,
            learn = config.learn_submissions,
            "session created"
        );
        Ok(Self {
            state: SessionState::Idle,
            core: Some(SessionCore::new(&config, writer)),
            worker: None,
            mode: Some(mode),
            guard: None,
            shutdown: ShutdownSignal::new(),
        })
    }

    /// Install the consumer called with every submitted query.
    ///
    /// Has no effect once the session has started.
    #[must_use]
    pub fn with_on_submit<F>(mut self, on_submit: F) -> Self
    where
        F: FnMut(&str) + Send + 'static,
    {
        if let Some(core) = self.core.as_mut() {
            core.set_on_submit(Box::new(on_submit));
        }
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        match self.state {
            SessionState::Running if self.shutdown.is_triggered() => SessionState::ShuttingDown,
            state => state,
        }
    }

    /// Editing state, available while not running.
    #[must_use]
    pub fn core(&self) -> Option<&SessionCore<W>> {
        self.core.as_ref()
    }

    /// Handle other threads can use to request a stop.
    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Enter the terminal mode and start reading `input` on the input thread.
    ///
    /// # Errors
    ///
    /// - [`SessionError::AlreadyStarted`] unless the session is idle.
    /// - [`SessionError::EnterMode`] if the terminal mode cannot be entered;
    ///   the session is then stopped.
    /// - [`SessionError::Spawn`] if the thread cannot be created; the mode is
    ///   released and the session stopped.
    pub fn start<R>(&mut self, input: R) -> Result<()>
    where
        R: Read + Send + 'static,
    {
        if self.state != SessionState::Idle {
            return Err(SessionError::AlreadyStarted(self.state()));
        }
        let (Some(mode), Some(core)) = (self.mode.take(), self.core.take()) else {
            return Err(SessionError::AlreadyStarted(self.state()));
        };

        let guard = match ModeGuard::acquire(mode) {
            Ok(guard) => guard,
            Err(err) => {
                tracing::error!(%err, "failed to enter terminal mode");
                self.core = Some(core);
                self.state = SessionState::Stopped;
                return Err(SessionError::EnterMode(err));
            }
        };
        self.guard = Some(guard);

        let shutdown = self.shutdown.clone();
        let spawned = thread::Builder::new()
            .name(INPUT_THREAD_NAME.into())
            .spawn(move || read_loop(core, input, shutdown));
        match spawned {
            Ok(worker) => {
                self.worker = Some(worker);
                self.state = SessionState::Running;
                tracing::info!("session started");
                Ok(())
            }
            Err(err) => {
                tracing::error!(%err, "failed to spawn input thread");
                self.state = SessionState::Stopped;
                self.release_mode()?;
                Err(SessionError::Spawn(err))
            }
        }
    }

    /// Block until shutdown is requested, then [`stop`](Self::stop).
    ///
    /// # Errors
    ///
    /// Returns the error from `stop`.
    pub fn wait(&mut self) -> Result<()> {
        if self.state == SessionState::Running {
            self.shutdown.wait();
        }
        self.stop()
    }

    /// [`start`](Self::start) then [`wait`](Self::wait).
    ///
    /// # Errors
    ///
    /// Returns the first error from either step.
    pub fn run<R>(&mut self, input: R) -> Result<()>
    where
        R: Read + Send + 'static,
    {
        self.start(input)?;
        self.wait()
    }

    /// Stop the session and restore the terminal. Idempotent.
    ///
    /// Joins the input thread, which returns after its current read.
    ///
    /// # Errors
    ///
    /// - [`SessionError::WorkerPanicked`] if the input thread panicked.
    /// - [`SessionError::Teardown`] if the terminal mode cannot be restored.
    ///   The mode is not touched again.
    pub fn stop(&mut self) -> Result<()> {
        match self.state {
            SessionState::Stopped => return Ok(()),
            SessionState::Idle => {
                self.state = SessionState::Stopped;
                tracing::info!("idle session stopped");
                return Ok(());
            }
            SessionState::Running | SessionState::ShuttingDown => {}
        }

        self.state = SessionState::ShuttingDown;
        self.shutdown.trigger();

        let mut result = Ok(());
        if let Some(worker) = self.worker.take() {
            match worker.join() {
                Ok(core) => self.core = Some(core),
                Err(_) => {
                    tracing::error!("input thread panicked");
                    result = Err(SessionError::WorkerPanicked);
                }
            }
        }

        let released = self.release_mode();
        self.state = SessionState::Stopped;
        tracing::info!("session stopped");
        result.and(released)
    }

    fn release_mode(&mut self) -> Result<()> {
        let Some(mut guard) = self.guard.take() else {
            return Ok(());
        };
        guard.release().map_err(|err| {
            tracing::error!(%err, "failed to restore terminal mode");
            SessionError::Teardown(err)
        })
    }
}

impl<W, M: TerminalMode> Drop for TerminalSession<W, M> {
    fn drop(&mut self) {
        if let Some(mut guard) = self.guard.take() {
            self.shutdown.trigger();
            if let Err(err) = guard.release() {
                tracing::error!(%err, "failed to restore terminal mode on drop");
            }
        }
    }
}
