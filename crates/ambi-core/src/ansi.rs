#![forbid(unsafe_code)]

//! ANSI escape sequence output helpers.
//!
//! Pure byte-generation functions for the handful of control sequences the
//! prompt needs. No state tracking: the prompt renderer decides when to call
//! them.
//!
//! # Sequence Reference
//!
//! | Category | Sequence | Description |
//! |----------|----------|-------------|
//! | CSI | `ESC [ n D` | CUB (Cursor Back n cells) |
//! | CSI | `ESC [ K` | EL 0 (Erase to end of line) |
//! | CSI | `ESC [ 2 K` | EL 2 (Erase entire line) |
//! | CSI | `ESC [ n m` | SGR (Select Graphic Rendition) |
//!
//! Raw mode turns off output newline translation, so line breaks are written
//! as `CR LF`.

use std::io::{self, Write};

/// Erase from the cursor to the end of the line: `CSI K`.
pub const ERASE_TO_EOL: &[u8] = b"\x1b[K";

/// Return to column 0 and erase the whole line: `CR CSI 2 K`.
pub const CLEAR_LINE: &[u8] = b"\r\x1b[2K";

/// Line break for raw-mode output.
pub const CRLF: &[u8] = b"\r\n";

/// SGR reset: `CSI 0 m`.
pub const SGR_RESET: &[u8] = b"\x1b[0m";

/// Prompt label style, bright blue bold: `CSI 34;1 m`.
pub const SGR_PROMPT: &[u8] = b"\x1b[34;1m";

/// Completion result style, green: `CSI 32 m`.
pub const SGR_RESULT: &[u8] = b"\x1b[32m";

/// Write `CSI n D`. Writes nothing when `cells` is zero.
pub fn cursor_left<W: Write>(w: &mut W, cells: usize) -> io::Result<()> {
    if cells == 0 {
        return Ok(());
    }
    write!(w, "\x1b[{cells}D")
}

/// Write the erase-to-end-of-line sequence.
#[inline]
pub fn erase_to_eol<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(ERASE_TO_EOL)
}

/// Write carriage return plus erase-line.
#[inline]
pub fn clear_line<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(CLEAR_LINE)
}

/// Write a raw-mode line break.
#[inline]
pub fn newline<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(CRLF)
}

/// Write `text` wrapped in `style` and a reset.
pub fn styled<W: Write>(w: &mut W, style: &[u8], text: &str) -> io::Result<()> {
    w.write_all(style)?;
    w.write_all(text.as_bytes())?;
    w.write_all(SGR_RESET)
}
