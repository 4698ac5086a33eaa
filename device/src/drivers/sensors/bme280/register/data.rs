use crate::domain::reading::RawSample;
use crate::drivers::bus::{BusError, RegisterBus};
use crate::traits::i2c::I2cAddress;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

// press_msb .. hum_lsb, read as one burst so the shadowed registers stay
// consistent
const PRESS_MSB: u8 = 0xF7;
const DATA_LEN: usize = 8;

pub struct Data;

impl Data {
    pub async fn read<I: I2c, D: DelayNs>(
        address: I2cAddress,
        bus: &mut RegisterBus<I, D>,
    ) -> Result<RawSample, BusError> {
        let buf = bus.burst_read::<DATA_LEN>(address, PRESS_MSB).await?;
        Ok(buf.into())
    }
}
