//! The per-window aggregate and its line-oriented wire form.
//!
//! ```text
//! {"temp":25.08,"press":1005.94,"hum":16.66,"rain":5.00}\n
//! ```

use core::fmt::Write as _;
use heapless::String;
use serde::Deserialize;

/// Upper bound for one encoded record, terminator included.
pub const MAX_RECORD_LEN: usize = 128;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// The encoded form does not fit into `MAX_RECORD_LEN`.
    Overflow,
    /// The line is not a well-formed record.
    Malformed,
}

#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AggregateRecord {
    /// Mean temperature, °C
    #[serde(rename = "temp")]
    pub temperature: f32,
    /// Mean pressure, hPa
    #[serde(rename = "press")]
    pub pressure: f32,
    /// Mean relative humidity, %
    #[serde(rename = "hum")]
    pub humidity: f32,
    /// Rain likelihood, 0 to 100
    #[serde(rename = "rain")]
    pub rain_probability: f32,
}

impl AggregateRecord {
    pub const fn new(temperature: f32, pressure: f32, humidity: f32, rain_probability: f32) -> Self {
        Self {
            temperature,
            pressure,
            humidity,
            rain_probability,
        }
    }

    /// Renders the record as one newline-terminated line, two decimals per field.
    pub fn encode(&self) -> Result<String<MAX_RECORD_LEN>, RecordError> {
        let mut line = String::new();
        write!(
            line,
            "{{\"temp\":{:.2},\"press\":{:.2},\"hum\":{:.2},\"rain\":{:.2}}}\n",
            self.temperature, self.pressure, self.humidity, self.rain_probability
        )
        .map_err(|_| RecordError::Overflow)?;
        Ok(line)
    }

    /// Parses one line as produced by [`encode`](Self::encode). A trailing
    /// terminator is accepted but not required.
    pub fn decode(line: &[u8]) -> Result<Self, RecordError> {
        let line = match line {
            [body @ .., b'\n'] => body,
            _ => line,
        };
        let (record, _) =
            serde_json_core::from_slice::<AggregateRecord>(line).map_err(|_| RecordError::Malformed)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_two_decimals() {
        let record = AggregateRecord::new(25.08, 1005.937, 16.664, 5.0);
        let line = record.encode().unwrap();
        assert_eq!(
            "{\"temp\":25.08,\"press\":1005.94,\"hum\":16.66,\"rain\":5.00}\n",
            line.as_str()
        );
    }

    #[test]
    fn encode_negative_temperature() {
        let record = AggregateRecord::new(-3.5, 990.0, 85.25, 100.0);
        let line = record.encode().unwrap();
        assert_eq!(
            "{\"temp\":-3.50,\"press\":990.00,\"hum\":85.25,\"rain\":100.00}\n",
            line.as_str()
        );
    }

    #[test]
    fn decode_line() {
        let record =
            AggregateRecord::decode(b"{\"temp\":21.50,\"press\":1013.25,\"hum\":40.00,\"rain\":15.00}\n")
                .unwrap();
        assert_eq!(AggregateRecord::new(21.5, 1013.25, 40.0, 15.0), record);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(Err(RecordError::Malformed), AggregateRecord::decode(b"\"temp\":21.50}"));
        assert_eq!(Err(RecordError::Malformed), AggregateRecord::decode(b""));
        assert_eq!(
            Err(RecordError::Malformed),
            AggregateRecord::decode(b"{\"temp\":21.50,\"press\":1013.25}")
        );
    }

    #[test]
    fn overflowing_record_is_rejected() {
        let record = AggregateRecord::new(-f32::MAX, -f32::MAX, -f32::MAX, 0.0);
        assert_eq!(Err(RecordError::Overflow), record.encode());
    }
}
