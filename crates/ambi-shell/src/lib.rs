#![forbid(unsafe_code)]

//! ambi interactive shell.
//!
//! The binary reads flags and `AMBI_*` environment variables, installs a
//! stderr log subscriber, and runs a completion prompt on the controlling
//! terminal until interrupted.

pub mod cli;
pub mod logging;
