#![forbid(unsafe_code)]

//! Core: terminal mode lifecycle, key events, input decoding, and the ANSI
//! output protocol.

pub mod ansi;
pub mod event;
pub mod input_decoder;
pub mod terminal_mode;
