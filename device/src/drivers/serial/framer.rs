use crate::domain::record::{AggregateRecord, RecordError, MAX_RECORD_LEN};
use embedded_io_async::{Error as _, ErrorKind, Write};
use heapless::String;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramerError {
    /// The record could not be rendered.
    Format,
    /// The link rejected a byte; the rest of the record was not sent.
    Transport(ErrorKind),
}

impl From<RecordError> for FramerError {
    fn from(_: RecordError) -> Self {
        FramerError::Format
    }
}

/// Writes aggregate records to a serial sink, one line per record.
pub struct OutputFramer<W>
where
    W: Write,
{
    sink: W,
}

impl<W> OutputFramer<W>
where
    W: Write,
{
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn encode(record: &AggregateRecord) -> Result<String<MAX_RECORD_LEN>, FramerError> {
        Ok(record.encode()?)
    }

    /// Transmits the record byte by byte and flushes the sink.
    ///
    /// A failed byte abandons the remainder of the record; the caller is not
    /// expected to retry.
    pub async fn send(&mut self, record: &AggregateRecord) -> Result<usize, FramerError> {
        let line = Self::encode(record)?;
        for byte in line.as_bytes() {
            match self.sink.write(core::slice::from_ref(byte)).await {
                Ok(0) => return Err(FramerError::Transport(ErrorKind::WriteZero)),
                Ok(_) => {}
                Err(e) => return Err(FramerError::Transport(e.kind())),
            }
        }
        self.sink
            .flush()
            .await
            .map_err(|e| FramerError::Transport(e.kind()))?;
        trace!("sent {} bytes", line.len());
        Ok(line.len())
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn release(self) -> W {
        self.sink
    }
}
