//! Factory trimming parameters and the vendor's fixed-point compensation.
//!
//! The formulas follow the integer reference implementation bit for bit:
//! 32-bit temperature and humidity, 64-bit pressure, same shift amounts. All
//! products wrap on overflow so `compensate` is total.

use crate::domain::reading::{RawSample, Reading};
use crate::drivers::bus::{BusError, RegisterBus};
use crate::traits::i2c::I2cAddress;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

// dig_T1 .. dig_P9, little endian
const CALIB_TP: u8 = 0x88;
const CALIB_TP_LEN: usize = 24;
const CALIB_H1: u8 = 0xA1;
// dig_H2 .. dig_H6, H4/H5 share a nibble-packed byte
const CALIB_H: u8 = 0xE1;
const CALIB_H_LEN: usize = 7;

// humidity clamp, 100 %RH in Q22.10 shifted left by 12
const HUMIDITY_MAX: i32 = 419_430_400;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationSet {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,

    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,

    pub dig_h1: u8,
    pub dig_h2: i16,
    pub dig_h3: u8,
    pub dig_h4: i16,
    pub dig_h5: i16,
    pub dig_h6: i8,
}

/// Carries temperature into the pressure and humidity formulas.
///
/// Only ever produced by [`CalibrationSet::fine_temperature`] for the sample
/// being converted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FineTemperature(pub i32);

impl CalibrationSet {
    pub async fn read<I: I2c, D: DelayNs>(
        address: I2cAddress,
        bus: &mut RegisterBus<I, D>,
    ) -> Result<CalibrationSet, BusError> {
        let tp = bus.burst_read::<CALIB_TP_LEN>(address, CALIB_TP).await?;
        let h1 = bus.read_register(address, CALIB_H1).await?;
        let h = bus.burst_read::<CALIB_H_LEN>(address, CALIB_H).await?;
        Ok(Self::from_registers(&tp, h1, &h))
    }

    pub fn from_registers(tp: &[u8; CALIB_TP_LEN], h1: u8, h: &[u8; CALIB_H_LEN]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([tp[i], tp[i + 1]]);
        let i16_at = |i: usize| i16::from_le_bytes([tp[i], tp[i + 1]]);

        CalibrationSet {
            dig_t1: u16_at(0),
            dig_t2: i16_at(2),
            dig_t3: i16_at(4),

            dig_p1: u16_at(6),
            dig_p2: i16_at(8),
            dig_p3: i16_at(10),
            dig_p4: i16_at(12),
            dig_p5: i16_at(14),
            dig_p6: i16_at(16),
            dig_p7: i16_at(18),
            dig_p8: i16_at(20),
            dig_p9: i16_at(22),

            dig_h1: h1,
            dig_h2: i16::from_le_bytes([h[0], h[1]]),
            dig_h3: h[2],
            // 0xE4[7:0] / 0xE5[3:0] and 0xE6[7:0] / 0xE5[7:4], msb signed
            dig_h4: ((h[3] as i8 as i16) << 4) | (h[4] & 0x0F) as i16,
            dig_h5: ((h[5] as i8 as i16) << 4) | (h[4] >> 4) as i16,
            dig_h6: h[6] as i8,
        }
    }

    /// Converts one raw burst. Temperature is always compensated first since
    /// the other two channels depend on it.
    pub fn compensate(&self, raw: RawSample) -> Reading {
        let t_fine = self.fine_temperature(raw.temperature);

        let temperature = Self::temperature(t_fine) as f32 / 100.0;
        let pressure = self.pressure(raw.pressure, t_fine) as f32 / 256.0 / 100.0;
        let humidity = self.humidity(raw.humidity, t_fine) as f32 / 1024.0;

        Reading::new(temperature, pressure, humidity)
    }

    pub fn fine_temperature(&self, adc_t: i32) -> FineTemperature {
        let t1 = self.dig_t1 as i32;
        let t2 = self.dig_t2 as i32;
        let t3 = self.dig_t3 as i32;

        let var1 = ((adc_t >> 3).wrapping_sub(t1 << 1)).wrapping_mul(t2) >> 11;
        let delta = (adc_t >> 4).wrapping_sub(t1);
        let var2 = ((delta.wrapping_mul(delta) >> 12).wrapping_mul(t3)) >> 14;

        FineTemperature(var1.wrapping_add(var2))
    }

    /// Temperature in 0.01 °C.
    pub fn temperature(t_fine: FineTemperature) -> i32 {
        t_fine.0.wrapping_mul(5).wrapping_add(128) >> 8
    }

    /// Pressure in Pa as Q24.8. Returns 0 when the calibration would divide by
    /// zero; callers treat that as "not ready".
    pub fn pressure(&self, adc_p: i32, t_fine: FineTemperature) -> u32 {
        let p1 = self.dig_p1 as i64;
        let p2 = self.dig_p2 as i64;
        let p3 = self.dig_p3 as i64;
        let p4 = self.dig_p4 as i64;
        let p5 = self.dig_p5 as i64;
        let p6 = self.dig_p6 as i64;
        let p7 = self.dig_p7 as i64;
        let p8 = self.dig_p8 as i64;
        let p9 = self.dig_p9 as i64;

        let mut var1 = (t_fine.0 as i64) - 128_000;
        let mut var2 = var1.wrapping_mul(var1).wrapping_mul(p6);
        var2 = var2.wrapping_add(var1.wrapping_mul(p5) << 17);
        var2 = var2.wrapping_add(p4 << 35);
        var1 = (var1.wrapping_mul(var1).wrapping_mul(p3) >> 8)
            .wrapping_add(var1.wrapping_mul(p2) << 12);
        var1 = ((1i64 << 47).wrapping_add(var1)).wrapping_mul(p1) >> 33;

        if var1 == 0 {
            return 0;
        }

        let mut p = 1_048_576 - adc_p as i64;
        p = ((p << 31).wrapping_sub(var2))
            .wrapping_mul(3125)
            .wrapping_div(var1);
        let var1 = p9.wrapping_mul(p >> 13).wrapping_mul(p >> 13) >> 25;
        let var2 = p8.wrapping_mul(p) >> 19;

        (((p.wrapping_add(var1).wrapping_add(var2)) >> 8).wrapping_add(p7 << 4)) as u32
    }

    /// Relative humidity in % as Q22.10.
    pub fn humidity(&self, adc_h: i32, t_fine: FineTemperature) -> u32 {
        let h1 = self.dig_h1 as i32;
        let h2 = self.dig_h2 as i32;
        let h3 = self.dig_h3 as i32;
        let h4 = self.dig_h4 as i32;
        let h5 = self.dig_h5 as i32;
        let h6 = self.dig_h6 as i32;

        let v = t_fine.0.wrapping_sub(76_800);

        let scaled = ((adc_h << 14)
            .wrapping_sub(h4 << 20)
            .wrapping_sub(h5.wrapping_mul(v))
            .wrapping_add(16_384))
            >> 15;
        let sensitivity = ((((v.wrapping_mul(h6) >> 10)
            .wrapping_mul((v.wrapping_mul(h3) >> 11).wrapping_add(32_768)))
            >> 10)
            .wrapping_add(2_097_152)
            .wrapping_mul(h2)
            .wrapping_add(8_192))
            >> 14;

        let mut v = scaled.wrapping_mul(sensitivity);
        v = v.wrapping_sub((((v >> 15).wrapping_mul(v >> 15) >> 7).wrapping_mul(h1)) >> 4);
        let v = v.clamp(0, HUMIDITY_MAX);

        (v >> 12) as u32
    }
}

/// Pure conversion of one raw sample; nothing is carried between calls.
pub fn compensate(raw: RawSample, calibration: &CalibrationSet) -> Reading {
    calibration.compensate(raw)
}
