use crate::drivers::bus::{BusError, RegisterBus};
use crate::traits::i2c::I2cAddress;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

const RESET: u8 = 0xE0;
const SOFT_RESET: u8 = 0xB6;

pub struct Reset;

impl Reset {
    /// Triggers a power-on-reset sequence. Calibration data is copied from
    /// NVM again afterwards, see `Status::im_update`.
    pub async fn soft_reset<I: I2c, D: DelayNs>(
        address: I2cAddress,
        bus: &mut RegisterBus<I, D>,
    ) -> Result<(), BusError> {
        bus.write_register(address, RESET, SOFT_RESET).await
    }
}
