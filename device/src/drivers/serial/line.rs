//! Receiving side of the record link: reassembles newline-terminated lines
//! from a byte stream.

use heapless::Vec;

pub const DEFAULT_MAX_LINE: usize = 256;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineState {
    Empty,
    Filling,
    LineReady,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineEvent {
    /// More bytes are needed.
    Pending,
    /// A complete line is available through [`LineAssembler::line`].
    Ready,
    /// The line exceeded the buffer and was discarded.
    Overflow,
}

pub struct LineAssembler<const N: usize = DEFAULT_MAX_LINE> {
    buf: Vec<u8, N>,
    state: LineState,
    overflows: u32,
}

impl<const N: usize> Default for LineAssembler<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LineAssembler<N> {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            state: LineState::Empty,
            overflows: 0,
        }
    }

    pub fn state(&self) -> LineState {
        self.state
    }

    /// Number of lines discarded for being too long.
    pub fn overflows(&self) -> u32 {
        self.overflows
    }

    /// Feeds one byte. A completed line stays available until the next push.
    ///
    /// Carriage returns are ignored and so are empty lines.
    pub fn push(&mut self, byte: u8) -> LineEvent {
        if self.state == LineState::LineReady {
            self.reset();
        }
        match byte {
            b'\r' => LineEvent::Pending,
            b'\n' if self.buf.is_empty() => LineEvent::Pending,
            b'\n' => {
                self.state = LineState::LineReady;
                LineEvent::Ready
            }
            _ => match self.buf.push(byte) {
                Ok(()) => {
                    self.state = LineState::Filling;
                    LineEvent::Pending
                }
                Err(_) => {
                    warn!("discarding line longer than {} bytes", N);
                    self.overflows = self.overflows.wrapping_add(1);
                    self.reset();
                    LineEvent::Overflow
                }
            },
        }
    }

    /// The completed line, without its terminator.
    pub fn line(&self) -> Option<&[u8]> {
        if self.state == LineState::LineReady {
            Some(self.buf.as_slice())
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.buf.clear();
        self.state = LineState::Empty;
    }
}
