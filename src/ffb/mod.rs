//! Force-feedback packet decoding.
//!
//! The vJoy driver forwards force-feedback reports written by games to the feeder that owns the
//! device. A packet is only reachable through per-field accessor functions, each of which either
//! extracts a sub-record or reports that the packet does not carry it. [`FfbSource`] abstracts
//! those accessors, and [`FfbDecoder`] turns one packet into a list of [`Diagnostic`] lines.

pub mod convert;
mod decoder;
mod frame;
mod source;
#[cfg(windows)]
pub mod sys;
mod types;

pub use crate::ffb::decoder::*;
pub use crate::ffb::frame::*;
pub use crate::ffb::source::*;
pub use crate::ffb::types::*;
