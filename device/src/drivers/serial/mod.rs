//! Newline-delimited record transport over a byte-oriented serial link.

pub mod framer;
pub mod line;

pub use framer::{FramerError, OutputFramer};
pub use line::{LineAssembler, LineEvent, LineState};
