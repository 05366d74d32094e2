#![forbid(unsafe_code)]

//! Prompt line rendering.
//!
//! [`PromptRenderer`] writes the prompt, echoes edits, and prints completion
//! results below the prompt. It remembers whether the prompt on screen is
//! current so the read loop can ask for a render on every iteration without
//! repainting an unchanged line.
//!
//! All line breaks are `CRLF`; raw mode turns off output translation.

use std::io::{self, Write};

use ambi_core::ansi;
use unicode_width::UnicodeWidthChar;

/// Writes the prompt line and completion output.
#[derive(Debug, Clone)]
pub struct PromptRenderer {
    label: String,
    styled: bool,
    prompted: bool,
}

impl PromptRenderer {
    /// Create a renderer for `label`. With `styled` off no SGR is emitted.
    #[must_use]
    pub fn new(label: impl Into<String>, styled: bool) -> Self {
        Self {
            label: label.into(),
            styled,
            prompted: false,
        }
    }

    /// The prompt label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the prompt on screen reflects the current state.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.prompted
    }

    /// Mark the prompt line as stale; the next [`render`](Self::render) redraws it.
    pub fn invalidate(&mut self) {
        self.prompted = false;
    }

    /// Draw the prompt followed by `line`, unless the prompt is current.
    ///
    /// Returns whether anything was written.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn render<W: Write>(&mut self, w: &mut W, line: &str) -> io::Result<bool> {
        if self.prompted {
            return Ok(false);
        }
        ansi::clear_line(w)?;
        if self.styled {
            ansi::styled(w, ansi::SGR_PROMPT, &self.label)?;
        } else {
            w.write_all(self.label.as_bytes())?;
        }
        w.write_all(b" ")?;
        w.write_all(line.as_bytes())?;
        w.flush()?;
        self.prompted = true;
        Ok(true)
    }

    /// Echo a typed character.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn echo<W: Write>(&mut self, w: &mut W, c: char) -> io::Result<()> {
        let mut buf = [0u8; 4];
        w.write_all(c.encode_utf8(&mut buf).as_bytes())
    }

    /// Remove an erased character from the display.
    ///
    /// Moves left by the character's cell width and erases to end of line.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn erase<W: Write>(&mut self, w: &mut W, c: char) -> io::Result<()> {
        ansi::cursor_left(w, c.width().unwrap_or(0))?;
        ansi::erase_to_eol(w)
    }

    /// Print a completion line below the prompt.
    ///
    /// The prompt is redrawn on the next render.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn show_results<W: Write>(&mut self, w: &mut W, results: &str) -> io::Result<()> {
        ansi::newline(w)?;
        if self.styled {
            ansi::styled(w, ansi::SGR_RESULT, results)?;
        } else {
            w.write_all(results.as_bytes())?;
        }
        ansi::newline(w)?;
        self.invalidate();
        Ok(())
    }

    /// End the prompt line after a submission.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn submit<W: Write>(&mut self, w: &mut W) -> io::Result<()> {
        ansi::newline(w)?;
        self.invalidate();
        Ok(())
    }
}
