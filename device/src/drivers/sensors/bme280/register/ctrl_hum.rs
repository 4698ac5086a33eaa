use super::ctrl_meas::Oversampling;
use crate::drivers::bus::{BusError, RegisterBus};
use crate::traits::i2c::I2cAddress;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

const CTRL_HUM: u8 = 0xF2;

/// Humidity oversampling. Changes only take effect after the next write to
/// `CtrlMeas`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CtrlHum {
    humidity: Oversampling,
    reserved: u8,
}

impl CtrlHum {
    pub async fn read<I: I2c, D: DelayNs>(
        address: I2cAddress,
        bus: &mut RegisterBus<I, D>,
    ) -> Result<CtrlHum, BusError> {
        Ok(bus.read_register(address, CTRL_HUM).await?.into())
    }

    pub async fn write<I: I2c, D: DelayNs>(
        address: I2cAddress,
        bus: &mut RegisterBus<I, D>,
        reg: CtrlHum,
    ) -> Result<(), BusError> {
        bus.write_register(address, CTRL_HUM, reg.into()).await
    }

    pub async fn modify<I: I2c, D: DelayNs, F: FnOnce(&mut CtrlHum)>(
        address: I2cAddress,
        bus: &mut RegisterBus<I, D>,
        modify: F,
    ) -> Result<(), BusError> {
        let mut reg = Self::read(address, bus).await?;
        modify(&mut reg);
        Self::write(address, bus, reg).await
    }

    pub fn humidity(&mut self, oversampling: Oversampling) -> &mut Self {
        self.humidity = oversampling;
        self
    }
}

impl From<u8> for CtrlHum {
    fn from(reg: u8) -> Self {
        CtrlHum {
            humidity: reg.into(),
            reserved: reg & !0b111,
        }
    }
}

impl From<CtrlHum> for u8 {
    fn from(reg: CtrlHum) -> u8 {
        reg.reserved | u8::from(reg.humidity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modify_keeps_reserved_bits() {
        let mut reg: CtrlHum = 0b1010_0000.into();
        reg.humidity(Oversampling::X1);
        assert_eq!(0b1010_0001, u8::from(reg));
    }
}
