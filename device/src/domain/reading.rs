//! Raw and compensated sensor samples.

/// Uncompensated ADC counts from one measurement burst.
///
/// Pressure and temperature are 20-bit values, humidity is 16-bit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    pub pressure: i32,
    pub temperature: i32,
    pub humidity: i32,
}

impl RawSample {
    pub const fn new(pressure: i32, temperature: i32, humidity: i32) -> Self {
        Self {
            pressure,
            temperature,
            humidity,
        }
    }
}

/// press msb/lsb/xlsb, temp msb/lsb/xlsb, hum msb/lsb
impl From<[u8; 8]> for RawSample {
    fn from(buf: [u8; 8]) -> Self {
        let twenty_bit = |msb: u8, lsb: u8, xlsb: u8| {
            ((msb as i32) << 12) | ((lsb as i32) << 4) | ((xlsb as i32) >> 4)
        };
        RawSample {
            pressure: twenty_bit(buf[0], buf[1], buf[2]),
            temperature: twenty_bit(buf[3], buf[4], buf[5]),
            humidity: ((buf[6] as i32) << 8) | buf[7] as i32,
        }
    }
}

/// A compensated sample in physical units.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// °C
    pub temperature: f32,
    /// hPa
    pub pressure: f32,
    /// %RH
    pub humidity: f32,
}

impl Reading {
    pub const fn new(temperature: f32, pressure: f32, humidity: f32) -> Self {
        Self {
            temperature,
            pressure,
            humidity,
        }
    }

    /// A pressure of exactly zero is the compensation's "not ready" sentinel,
    /// never a physical value.
    pub fn pressure_ready(&self) -> bool {
        self.pressure != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpack_burst() {
        let raw: RawSample = [0x65, 0x70, 0x50, 0x7E, 0xED, 0x00, 0x5A, 0x6A].into();
        assert_eq!(RawSample::new(415493, 519888, 23146), raw);
    }

    #[test]
    fn xlsb_low_nibble_is_ignored() {
        let raw: RawSample = [0x00, 0x00, 0x0F, 0x00, 0x00, 0xFF, 0x00, 0x00].into();
        assert_eq!(0, raw.pressure);
        assert_eq!(0xF, raw.temperature);
    }

    #[test]
    fn zero_pressure_is_not_ready() {
        assert!(!Reading::new(21.0, 0.0, 40.0).pressure_ready());
        assert!(Reading::new(21.0, 1013.25, 40.0).pressure_ready());
    }
}
