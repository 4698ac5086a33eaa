use crate::drivers::bus::{BusError, RegisterBus};
use crate::traits::i2c::I2cAddress;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

const STATUS: u8 = 0xF3;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    measuring: bool,
    im_update: bool,
}

impl Status {
    pub async fn read<I: I2c, D: DelayNs>(
        address: I2cAddress,
        bus: &mut RegisterBus<I, D>,
    ) -> Result<Status, BusError> {
        Ok(bus.read_register(address, STATUS).await?.into())
    }

    /// A conversion is running; results land in the data registers when done.
    pub fn measuring(&self) -> bool {
        self.measuring
    }

    /// NVM calibration data is being copied into the image registers.
    pub fn im_update(&self) -> bool {
        self.im_update
    }
}

impl From<u8> for Status {
    fn from(reg: u8) -> Self {
        Status {
            measuring: (reg & 0b1000) != 0,
            im_update: (reg & 0b0001) != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_status_bits() {
        let status: Status = 0b1001.into();
        assert!(status.measuring());
        assert!(status.im_update());

        let status: Status = 0b0110.into();
        assert!(!status.measuring());
        assert!(!status.im_update());
    }
}
