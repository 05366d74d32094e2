#![forbid(unsafe_code)]

//! Input decoder state machine.
//!
//! Decodes raw terminal input, one byte at a time, into
//! [`crate::event::InputEvent`] values.
//!
//! # Design
//!
//! The decoder is a three-state machine:
//! - `Ground`: ASCII characters and control codes map directly to events
//! - `Framing`: after `ESC`, bytes accumulate into a bounded sequence buffer
//! - `Utf8`: collecting the continuation bytes of a multi-byte character
//!
//! # Framing
//!
//! The escape marker and the bytes that follow it are collected into one
//! sequence. A sequence is complete when either
//! - it holds `max_sequence_len` bytes (default [`DEFAULT_MAX_SEQUENCE_LEN`]), or
//! - a terminator is seen: a CSI final byte (`0x40..=0x7E`) after `ESC [`,
//!   the single byte after `ESC O`, or any byte after `ESC` other than `[`
//!   and `O`.
//!
//! The byte bound is a fixed, configured constant. It is never inferred from
//! the content, so a decoder configured for 3 bytes frames arrow keys exactly
//! and may misframe longer sequences such as `ESC [ 1 ; 5 A` when their
//! terminator is not reached in time.
//!
//! A control byte (`0x00..=0x1F` or `DEL`) never belongs to a sequence. It
//! drops the partial frame and is decoded as fresh input, so `ESC` followed
//! by `Ctrl+C` still interrupts. A second `ESC` instead surfaces the partial
//! frame as `Unknown` and starts a new one. Either way a byte completes at
//! most one event.
//!
//! There is no partial-sequence timeout: a lone `ESC` stays pending until more
//! bytes arrive or [`InputDecoder::flush`] is called.

use crate::event::{
    BACKSPACE, CANCEL, CARRIAGE_RETURN, DELETE, END_OF_FILE, END_OF_TEXT, ESCAPE, InputEvent,
    LINE_FEED, TAB, is_query_char,
};

/// Default maximum escape-sequence length in bytes, marker included.
///
/// Arrow keys (`ESC [ A`) are exactly this long.
pub const DEFAULT_MAX_SEQUENCE_LEN: usize = 3;

/// Decoder state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DecoderState {
    /// Normal character input.
    #[default]
    Ground,
    /// Collecting an escape sequence.
    Framing,
    /// Collecting UTF-8 multi-byte sequence.
    Utf8 {
        /// Bytes collected so far.
        collected: u8,
        /// Total bytes expected.
        expected: u8,
    },
}

/// Byte-driven terminal input decoder.
///
/// ```
/// use ambi_core::event::InputEvent;
/// use ambi_core::input_decoder::InputDecoder;
///
/// let mut decoder = InputDecoder::new();
/// let events = decoder.decode_all(b"ab\x1b[A");
/// assert_eq!(events, vec![InputEvent::Char('a'), InputEvent::Char('b'), InputEvent::Up]);
/// assert!(decoder.pending().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct InputDecoder {
    /// Current decoder state.
    state: DecoderState,
    /// Upper bound on a framed sequence, in bytes.
    max_sequence_len: usize,
    /// Escape sequence bytes collected so far.
    sequence: Vec<u8>,
    /// UTF-8 bytes collected so far.
    utf8_buffer: [u8; 4],
}

impl Default for InputDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl InputDecoder {
    /// Create a decoder with the default sequence bound.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_sequence_len(DEFAULT_MAX_SEQUENCE_LEN)
    }

    /// Create a decoder with a custom sequence bound (clamped to at least 1).
    #[must_use]
    pub fn with_max_sequence_len(max_sequence_len: usize) -> Self {
        let max_sequence_len = max_sequence_len.max(1);
        Self {
            state: DecoderState::Ground,
            max_sequence_len,
            sequence: Vec::with_capacity(max_sequence_len),
            utf8_buffer: [0; 4],
        }
    }

    /// The configured sequence bound.
    #[must_use]
    pub fn max_sequence_len(&self) -> usize {
        self.max_sequence_len
    }

    /// Bytes of the escape sequence currently being framed.
    ///
    /// Empty whenever the decoder is not inside a sequence.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.sequence
    }

    /// Whether an escape sequence is being framed.
    #[must_use]
    pub fn is_framing(&self) -> bool {
        self.state == DecoderState::Framing
    }

    /// Decode a slice of bytes and return the completed events in order.
    pub fn decode_all(&mut self, input: &[u8]) -> Vec<InputEvent> {
        input.iter().filter_map(|&byte| self.decode(byte)).collect()
    }

    /// Feed one byte; returns an event once one is complete.
    pub fn decode(&mut self, byte: u8) -> Option<InputEvent> {
        let event = match self.state {
            DecoderState::Ground => self.process_ground(byte),
            DecoderState::Framing => self.process_framing(byte),
            DecoderState::Utf8 {
                collected,
                expected,
            } => self.process_utf8(byte, collected, expected),
        };
        tracing::trace!(byte, ?event, "decoded input byte");
        event
    }

    /// End of input: surface a dangling partial sequence as `Unknown`.
    ///
    /// A partial UTF-8 character is dropped.
    pub fn flush(&mut self) -> Option<InputEvent> {
        match std::mem::take(&mut self.state) {
            DecoderState::Framing => {
                let partial = std::mem::take(&mut self.sequence);
                tracing::debug!(?partial, "partial escape sequence at end of input");
                Some(InputEvent::Unknown(partial))
            }
            DecoderState::Ground | DecoderState::Utf8 { .. } => None,
        }
    }

    /// Drop any partial state and return to ground.
    pub fn reset(&mut self) {
        self.state = DecoderState::Ground;
        self.sequence.clear();
    }

    /// Process byte in ground state.
    fn process_ground(&mut self, byte: u8) -> Option<InputEvent> {
        match byte {
            ESCAPE => self.begin_sequence(),
            DELETE | BACKSPACE => Some(InputEvent::Backspace),
            TAB => Some(InputEvent::Tab),
            LINE_FEED | CARRIAGE_RETURN => Some(InputEvent::Enter),
            END_OF_TEXT | END_OF_FILE | CANCEL => Some(InputEvent::Interrupt),
            // Printable ASCII
            0x20..=0x7E => Some(char_event(byte as char)),
            // UTF-8 lead bytes
            0xC0..=0xDF => self.begin_utf8(byte, 2),
            0xE0..=0xEF => self.begin_utf8(byte, 3),
            0xF0..=0xF7 => self.begin_utf8(byte, 4),
            _ => Some(InputEvent::Ignored),
        }
    }

    fn begin_sequence(&mut self) -> Option<InputEvent> {
        self.sequence.clear();
        self.sequence.push(ESCAPE);
        if self.sequence.len() >= self.max_sequence_len {
            return Some(self.finish_sequence());
        }
        self.state = DecoderState::Framing;
        None
    }

    /// Process byte while framing an escape sequence.
    fn process_framing(&mut self, byte: u8) -> Option<InputEvent> {
        if byte == ESCAPE {
            // A new marker abandons the partial frame.
            let abandoned = std::mem::take(&mut self.sequence);
            tracing::debug!(?abandoned, "escape sequence interrupted by a new escape");
            self.state = DecoderState::Ground;
            let restarted = self.begin_sequence();
            debug_assert!(restarted.is_none());
            return Some(InputEvent::Unknown(abandoned));
        }
        if byte < 0x20 || byte == DELETE {
            let abandoned = std::mem::take(&mut self.sequence);
            tracing::debug!(?abandoned, byte, "escape sequence interrupted by a control byte");
            self.state = DecoderState::Ground;
            return self.process_ground(byte);
        }

        self.sequence.push(byte);
        if self.sequence.len() >= self.max_sequence_len || is_terminated(&self.sequence) {
            return Some(self.finish_sequence());
        }
        None
    }

    fn finish_sequence(&mut self) -> InputEvent {
        self.state = DecoderState::Ground;
        let event = InputEvent::from_sequence(std::mem::take(&mut self.sequence));
        if let InputEvent::Unknown(bytes) = &event {
            tracing::debug!(?bytes, "unrecognized escape sequence");
        }
        event
    }

    fn begin_utf8(&mut self, lead: u8, expected: u8) -> Option<InputEvent> {
        self.utf8_buffer[0] = lead;
        self.state = DecoderState::Utf8 {
            collected: 1,
            expected,
        };
        None
    }

    /// Process UTF-8 continuation bytes.
    fn process_utf8(&mut self, byte: u8, collected: u8, expected: u8) -> Option<InputEvent> {
        if (byte & 0xC0) != 0x80 {
            // Not a continuation byte: drop the partial character and treat
            // this byte as fresh input.
            self.state = DecoderState::Ground;
            return self.process_ground(byte);
        }

        self.utf8_buffer[collected as usize] = byte;
        let collected = collected + 1;
        if collected < expected {
            self.state = DecoderState::Utf8 {
                collected,
                expected,
            };
            return None;
        }

        self.state = DecoderState::Ground;
        let decoded = std::str::from_utf8(&self.utf8_buffer[..expected as usize])
            .ok()
            .and_then(|s| s.chars().next());
        Some(decoded.map_or(InputEvent::Ignored, char_event))
    }
}

fn char_event(c: char) -> InputEvent {
    if is_query_char(c) {
        InputEvent::Char(c)
    } else {
        InputEvent::Ignored
    }
}

/// Whether a partial sequence has reached its terminator.
fn is_terminated(sequence: &[u8]) -> bool {
    match sequence {
        [ESCAPE, b'[' | b'O'] => false,
        [ESCAPE, _] => true,
        [ESCAPE, b'[', .., last] => (0x40..=0x7E).contains(last),
        [ESCAPE, b'O', _, ..] => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DOWN_ARROW, LEFT_ARROW, RIGHT_ARROW, UP_ARROW};

    #[test]
    fn ascii_characters_decoded() {
        let mut decoder = InputDecoder::new();

        let events = decoder.decode_all(b"abc");
        assert_eq!(
            events,
            vec![
                InputEvent::Char('a'),
                InputEvent::Char('b'),
                InputEvent::Char('c')
            ]
        );
    }

    #[test]
    fn word_punctuation_is_a_char() {
        let mut decoder = InputDecoder::new();

        let events = decoder.decode_all(b"robot2_b");
        assert_eq!(events.len(), 8);
        assert!(events[6].is_char('_'));
    }

    #[test]
    fn other_punctuation_ignored() {
        let mut decoder = InputDecoder::new();

        assert_eq!(decoder.decode_all(b" !?"), vec![InputEvent::Ignored; 3]);
    }

    #[test]
    fn control_characters() {
        let mut decoder = InputDecoder::new();

        assert_eq!(decoder.decode(DELETE), Some(InputEvent::Backspace));
        assert_eq!(decoder.decode(BACKSPACE), Some(InputEvent::Backspace));
        assert_eq!(decoder.decode(TAB), Some(InputEvent::Tab));
        assert_eq!(decoder.decode(LINE_FEED), Some(InputEvent::Enter));
        assert_eq!(decoder.decode(CARRIAGE_RETURN), Some(InputEvent::Enter));
        assert_eq!(decoder.decode(0x01), Some(InputEvent::Ignored));
    }

    #[test]
    fn interrupt_bytes_collapse() {
        let mut decoder = InputDecoder::new();

        for byte in [END_OF_TEXT, END_OF_FILE, CANCEL] {
            assert_eq!(decoder.decode(byte), Some(InputEvent::Interrupt));
        }
    }

    #[test]
    fn arrow_keys() {
        let mut decoder = InputDecoder::new();

        assert_eq!(decoder.decode_all(UP_ARROW), vec![InputEvent::Up]);
        assert_eq!(decoder.decode_all(DOWN_ARROW), vec![InputEvent::Down]);
        assert_eq!(decoder.decode_all(RIGHT_ARROW), vec![InputEvent::Right]);
        assert_eq!(decoder.decode_all(LEFT_ARROW), vec![InputEvent::Left]);
    }

    #[test]
    fn ss3_arrow_keys() {
        let mut decoder = InputDecoder::new();

        assert_eq!(decoder.decode_all(b"\x1bOA"), vec![InputEvent::Up]);
        assert_eq!(decoder.decode_all(b"\x1bOB"), vec![InputEvent::Down]);
    }

    #[test]
    fn framing_holds_bytes_until_complete() {
        let mut decoder = InputDecoder::new();

        assert_eq!(decoder.decode(ESCAPE), None);
        assert!(decoder.is_framing());
        assert_eq!(decoder.pending(), &[ESCAPE]);
        assert_eq!(decoder.decode(b'['), None);
        assert_eq!(decoder.pending(), b"\x1b[");
        assert_eq!(decoder.decode(b'A'), Some(InputEvent::Up));
        assert!(!decoder.is_framing());
        assert!(decoder.pending().is_empty());
    }

    #[test]
    fn sequence_bound_cuts_long_sequences() {
        let mut decoder = InputDecoder::new();

        // Ctrl+Up is six bytes; the three-byte bound frames `ESC [ 1`.
        let events = decoder.decode_all(b"\x1b[1;5A");
        assert_eq!(events[0], InputEvent::Unknown(b"\x1b[1".to_vec()));
        assert!(decoder.pending().is_empty());
    }

    #[test]
    fn larger_bound_frames_modified_arrows_by_terminator() {
        let mut decoder = InputDecoder::with_max_sequence_len(8);

        let events = decoder.decode_all(b"\x1b[1;5Ax");
        assert_eq!(
            events,
            vec![
                InputEvent::Unknown(b"\x1b[1;5A".to_vec()),
                InputEvent::Char('x')
            ]
        );
    }

    #[test]
    fn alt_letter_terminates_after_two_bytes() {
        let mut decoder = InputDecoder::new();

        let events = decoder.decode_all(b"\x1bab");
        assert_eq!(
            events,
            vec![
                InputEvent::Unknown(b"\x1ba".to_vec()),
                InputEvent::Char('b')
            ]
        );
    }

    #[test]
    fn escape_mid_frame_restarts_framing() {
        let mut decoder = InputDecoder::new();

        let events = decoder.decode_all(b"\x1b\x1b[A");
        assert_eq!(
            events,
            vec![InputEvent::Unknown(vec![ESCAPE]), InputEvent::Up]
        );
        assert!(decoder.pending().is_empty());
    }

    #[test]
    fn control_byte_cuts_frame_short() {
        let mut decoder = InputDecoder::new();

        assert_eq!(decoder.decode(ESCAPE), None);
        assert_eq!(decoder.decode(END_OF_TEXT), Some(InputEvent::Interrupt));
        assert!(!decoder.is_framing());
        assert!(decoder.pending().is_empty());

        assert_eq!(decoder.decode_all(b"\x1b[\r"), vec![InputEvent::Enter]);
        assert_eq!(decoder.decode_all(b"\x1b\x7f"), vec![InputEvent::Backspace]);
        assert_eq!(decoder.decode_all(b"\x1b\t"), vec![InputEvent::Tab]);
        assert_eq!(decoder.decode_all(b"\x1bO\x04"), vec![InputEvent::Interrupt]);
    }

    #[test]
    fn decoding_resumes_after_cut_frame() {
        let mut decoder = InputDecoder::with_max_sequence_len(8);

        let events = decoder.decode_all(b"\x1b[1\rx\x1b[A");
        assert_eq!(
            events,
            vec![InputEvent::Enter, InputEvent::Char('x'), InputEvent::Up]
        );
    }

    #[test]
    fn bound_of_one_emits_marker_alone() {
        let mut decoder = InputDecoder::with_max_sequence_len(0);
        assert_eq!(decoder.max_sequence_len(), 1);

        let events = decoder.decode_all(b"\x1b[A");
        assert_eq!(
            events,
            vec![
                InputEvent::Unknown(vec![ESCAPE]),
                InputEvent::Ignored,
                InputEvent::Char('A')
            ]
        );
    }

    #[test]
    fn flush_surfaces_partial_sequence() {
        let mut decoder = InputDecoder::new();

        assert_eq!(decoder.decode(ESCAPE), None);
        assert_eq!(decoder.flush(), Some(InputEvent::Unknown(vec![ESCAPE])));
        assert!(decoder.pending().is_empty());
        assert_eq!(decoder.flush(), None);
    }

    #[test]
    fn reset_clears_pending() {
        let mut decoder = InputDecoder::new();

        decoder.decode_all(b"\x1b[");
        decoder.reset();
        assert!(!decoder.is_framing());
        assert!(decoder.pending().is_empty());
        assert_eq!(decoder.decode(b'A'), Some(InputEvent::Char('A')));
    }

    #[test]
    fn utf8_characters() {
        let mut decoder = InputDecoder::new();

        // é (U+00E9) = 0xC3 0xA9
        assert_eq!(
            decoder.decode_all(&[0xC3, 0xA9]),
            vec![InputEvent::Char('é')]
        );
        // ж (U+0436) = 0xD0 0xB6
        assert_eq!(
            decoder.decode_all(&[0xD0, 0xB6]),
            vec![InputEvent::Char('ж')]
        );
    }

    #[test]
    fn utf8_symbol_ignored() {
        let mut decoder = InputDecoder::new();

        // → (U+2192) is not a query character.
        assert_eq!(
            decoder.decode_all(&[0xE2, 0x86, 0x92]),
            vec![InputEvent::Ignored]
        );
    }

    #[test]
    fn broken_utf8_reprocesses_next_byte() {
        let mut decoder = InputDecoder::new();

        let events = decoder.decode_all(&[0xC3, b'a']);
        assert_eq!(events, vec![InputEvent::Char('a')]);

        let events = decoder.decode_all(&[0xE2, ESCAPE, b'[', b'B']);
        assert_eq!(events, vec![InputEvent::Down]);
    }

    #[test]
    fn no_panic_on_invalid_input() {
        let mut decoder = InputDecoder::new();

        let garbage = [
            0xFF, 0xFE, 0x00, 0x1B, 0x1B, 0x1B, b'[', 0xFF, b']', 0x00, 0xF0, 0x80,
        ];

        let _ = decoder.decode_all(&garbage);
        let _ = decoder.flush();
        assert_eq!(decoder.decode_all(UP_ARROW), vec![InputEvent::Up]);
    }
}
