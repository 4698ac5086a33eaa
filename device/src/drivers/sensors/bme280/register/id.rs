use crate::drivers::bus::{BusError, RegisterBus};
use crate::traits::i2c::I2cAddress;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

const ID: u8 = 0xD0;

/// Chip identifiers this driver accepts.
pub const KNOWN_CHIP_IDS: &[u8] = &[0x60];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipId(u8);

impl ChipId {
    pub async fn read<I: I2c, D: DelayNs>(
        address: I2cAddress,
        bus: &mut RegisterBus<I, D>,
    ) -> Result<ChipId, BusError> {
        Ok(bus.read_register(address, ID).await?.into())
    }

    pub fn is_known(&self) -> bool {
        KNOWN_CHIP_IDS.contains(&self.0)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl From<u8> for ChipId {
    fn from(id: u8) -> Self {
        ChipId(id)
    }
}
