#![forbid(unsafe_code)]

//! End-to-end session tests.
//!
//! Sessions are driven with in-memory input and a `Vec<u8>` display, under a
//! counting terminal mode, through the full start/read/stop lifecycle.

use std::io::{self, Cursor, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use ambi_core::terminal_mode::TerminalMode;
use ambi_runtime::{SessionConfig, SessionError, SessionState, TerminalSession};
use proptest::prelude::*;

// ============================================================================
// Test Infrastructure
// ============================================================================

const DEMO_VOCABULARY: [&str; 8] = [
    "the", "there", "their", "robot", "robot1", "robot2_b", "robber", "robbed",
];

#[derive(Debug, Clone, Default)]
struct ModeCounts {
    entered: Arc<AtomicUsize>,
    left: Arc<AtomicUsize>,
}

impl ModeCounts {
    fn entered(&self) -> usize {
        self.entered.load(Ordering::SeqCst)
    }

    fn left(&self) -> usize {
        self.left.load(Ordering::SeqCst)
    }
}

struct CountingMode {
    counts: ModeCounts,
    fail_enter: bool,
    fail_leave: bool,
}

impl CountingMode {
    fn new(counts: &ModeCounts) -> Self {
        Self {
            counts: counts.clone(),
            fail_enter: false,
            fail_leave: false,
        }
    }
}

impl TerminalMode for CountingMode {
    fn enter(&mut self) -> io::Result<()> {
        if self.fail_enter {
            return Err(io::Error::other("not a terminal"));
        }
        self.counts.entered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn leave(&mut self) -> io::Result<()> {
        self.counts.left.fetch_add(1, Ordering::SeqCst);
        if self.fail_leave {
            return Err(io::Error::other("restore failed"));
        }
        Ok(())
    }
}

/// Input that blocks until bytes are sent; dropping the sender is EOF.
struct ChannelReader(mpsc::Receiver<u8>);

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let Ok(first) = self.0.recv() else {
            return Ok(0);
        };
        buf[0] = first;
        let mut n = 1;
        while n < buf.len() {
            match self.0.try_recv() {
                Ok(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                Err(_) => break,
            }
        }
        Ok(n)
    }
}

fn channel_input() -> (mpsc::Sender<u8>, ChannelReader) {
    let (tx, rx) = mpsc::channel();
    (tx, ChannelReader(rx))
}

fn demo_config() -> SessionConfig {
    SessionConfig::default()
        .with_vocabulary(DEMO_VOCABULARY)
        .with_styled(false)
}

fn session(counts: &ModeCounts) -> TerminalSession<Vec<u8>, CountingMode> {
    TerminalSession::new(demo_config(), Vec::new(), CountingMode::new(counts)).unwrap()
}

fn display(session: &TerminalSession<Vec<u8>, CountingMode>) -> String {
    String::from_utf8_lossy(session.core().unwrap().writer()).into_owned()
}

fn run_bytes(input: &[u8]) -> (TerminalSession<Vec<u8>, CountingMode>, ModeCounts) {
    let counts = ModeCounts::default();
    let mut session = session(&counts);
    session.run(Cursor::new(input.to_vec())).unwrap();
    (session, counts)
}

// ============================================================================
// Completion
// ============================================================================

#[test]
fn rob_tab_lists_demo_matches() {
    let (session, _) = run_bytes(b"rob\t\x03");

    let out = display(&session);
    assert!(
        out.contains("\r\nrobbed\trobber\trobot\trobot1\trobot2_b\r\n"),
        "unexpected display: {out:?}"
    );

    let core = session.core().unwrap();
    let results = core.trie().search("rob");
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|c| c.count == 1));
}

#[test]
fn prompt_is_redrawn_after_results() {
    let (session, _) = run_bytes(b"rob\t");

    let out = display(&session);
    assert!(
        out.starts_with("\r\x1b[2Kambi> rob\r\n"),
        "unexpected display: {out:?}"
    );
    assert!(out.ends_with("robot2_b\r\n\r\x1b[2Kambi> rob\r\n"));
}

#[test]
fn submit_then_complete_leaves_counter_alone() {
    let (session, _) = run_bytes(b"robot\rrobot\t");

    let core = session.core().unwrap();
    assert_eq!(core.trie().count("robot"), 1);
    assert_eq!(core.history().entries(), ["robot"]);
    assert_eq!(core.editor().buffer(), "robot");
}

#[test]
fn learning_session_ranks_submissions_first() {
    let counts = ModeCounts::default();
    let config = demo_config().with_learn_submissions(true);
    let mut session =
        TerminalSession::new(config, Vec::new(), CountingMode::new(&counts)).unwrap();
    session
        .run(Cursor::new(b"robot1\rrob\t".to_vec()))
        .unwrap();

    let out = display(&session);
    assert!(out.contains("\r\nrobot1\trobbed\trobber\trobot\trobot2_b\r\n"));
}

#[test]
fn submissions_reach_consumer_in_order() {
    let counts = ModeCounts::default();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut session = session(&counts).with_on_submit(move |q| {
        sink.lock().unwrap().push(q.to_owned());
    });

    session
        .run(Cursor::new(b"the\r\rrob\x7f\x7fobot\r".to_vec()))
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), ["the", "", "robot"]);
    assert_eq!(session.core().unwrap().history().entries(), ["the", "robot"]);
}

#[test]
fn history_recall_through_session() {
    let (session, _) = run_bytes(b"a\rab\rabc\r\x1b[A\x1b[A\x1b[B");

    let core = session.core().unwrap();
    assert_eq!(core.editor().buffer(), "abc");
    assert_eq!(core.history().index(), 1);
    assert_eq!(core.history().len(), 3);
}

#[test]
fn split_escape_sequence_still_decodes() {
    let (tx, input) = channel_input();
    let counts = ModeCounts::default();
    let mut session = session(&counts);
    session.start(input).unwrap();

    for &byte in b"x\r\x1b" {
        tx.send(byte).unwrap();
    }
    for &byte in b"[A" {
        tx.send(byte).unwrap();
    }
    drop(tx);
    session.wait().unwrap();

    assert_eq!(session.core().unwrap().editor().buffer(), "x");
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn interrupt_ends_session_and_restores_once() {
    let (session, counts) = run_bytes(b"ro\x03bot");

    assert_eq!(session.state(), SessionState::Stopped);
    assert_eq!(session.core().unwrap().editor().buffer(), "ro");
    assert_eq!(counts.entered(), 1);
    assert_eq!(counts.left(), 1);
}

#[test]
fn interrupt_after_escape_ends_session() {
    let (session, counts) = run_bytes(b"ro\x1b\x03bot");

    assert_eq!(session.state(), SessionState::Stopped);
    assert_eq!(session.core().unwrap().editor().buffer(), "ro");
    assert_eq!(counts.left(), 1);
}

#[test]
fn end_of_input_ends_session() {
    let (session, counts) = run_bytes(b"rob");

    assert_eq!(session.state(), SessionState::Stopped);
    assert!(display(&session).ends_with("rob\r\n"));
    assert_eq!(counts.left(), 1);
}

#[test]
fn explicit_stop_through_handle() {
    let (tx, input) = channel_input();
    let counts = ModeCounts::default();
    let mut session = session(&counts);
    session.start(input).unwrap();
    assert_eq!(session.state(), SessionState::Running);

    let handle = session.shutdown_handle();
    handle.trigger();
    assert_eq!(session.state(), SessionState::ShuttingDown);

    // The input thread notices on its next byte.
    tx.send(b'z').unwrap();
    session.wait().unwrap();

    assert_eq!(session.state(), SessionState::Stopped);
    assert_eq!(counts.entered(), 1);
    assert_eq!(counts.left(), 1);
}

#[test]
fn repeated_stop_is_noop() {
    let (mut session, counts) = run_bytes(b"x");

    session.stop().unwrap();
    session.stop().unwrap();
    drop(session);
    assert_eq!(counts.entered(), 1);
    assert_eq!(counts.left(), 1);
}

#[test]
fn drop_while_running_restores_once() {
    let (tx, input) = channel_input();
    let counts = ModeCounts::default();
    let mut session = session(&counts);
    session.start(input).unwrap();

    drop(session);
    assert_eq!(counts.left(), 1);
    drop(tx);
}

#[test]
fn second_start_is_rejected() {
    let (tx, input) = channel_input();
    let counts = ModeCounts::default();
    let mut session = session(&counts);
    session.start(input).unwrap();

    let err = session.start(Cursor::new(Vec::new())).unwrap_err();
    assert!(matches!(
        err,
        SessionError::AlreadyStarted(SessionState::Running)
    ));

    drop(tx);
    session.wait().unwrap();
    assert_eq!(counts.entered(), 1);
    assert_eq!(counts.left(), 1);
}

#[test]
fn failed_enter_stops_and_restores() {
    let counts = ModeCounts::default();
    let mut mode = CountingMode::new(&counts);
    mode.fail_enter = true;
    let mut session = TerminalSession::new(demo_config(), Vec::new(), mode).unwrap();

    let err = session.run(Cursor::new(b"rob".to_vec())).unwrap_err();
    assert!(matches!(err, SessionError::EnterMode(_)));
    assert_eq!(session.state(), SessionState::Stopped);
    assert!(session.core().is_some());
    assert_eq!(counts.entered(), 0);
    assert_eq!(counts.left(), 1);
}

// ============================================================================
// Teardown logging
// ============================================================================

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn teardown_failure_is_reported() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::ERROR)
        .with_writer(move || writer.clone())
        .finish();

    let counts = ModeCounts::default();
    let result = tracing::subscriber::with_default(subscriber, || {
        let mut mode = CountingMode::new(&counts);
        mode.fail_leave = true;
        let mut session = TerminalSession::new(demo_config(), Vec::new(), mode).unwrap();
        session.run(Cursor::new(b"rob\x03".to_vec()))
    });

    assert!(matches!(result, Err(SessionError::Teardown(_))));
    assert_eq!(counts.left(), 1);
    let text = String::from_utf8_lossy(&logs.0.lock().unwrap()).into_owned();
    assert!(text.contains("failed to restore terminal mode"), "logs: {text}");
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn arbitrary_input_restores_terminal_once(
        input in prop::collection::vec(any::<u8>(), 0..128),
    ) {
        let counts = ModeCounts::default();
        let mut session = session(&counts);
        prop_assert!(session.run(Cursor::new(input)).is_ok());
        prop_assert_eq!(session.state(), SessionState::Stopped);
        prop_assert_eq!(counts.entered(), 1);
        prop_assert_eq!(counts.left(), 1);

        let core = session.core().unwrap();
        prop_assert!(core.history().index() <= core.history().len());
        prop_assert_eq!(core.trie().len(), DEMO_VOCABULARY.len());
    }
}
