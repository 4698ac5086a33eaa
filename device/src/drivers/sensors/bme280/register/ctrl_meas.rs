use crate::drivers::bus::{BusError, RegisterBus};
use crate::traits::i2c::I2cAddress;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

const CTRL_MEAS: u8 = 0xF4;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oversampling {
    Skipped,
    X1,
    X2,
    X4,
    X8,
    X16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Sleep,
    Forced,
    Normal,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CtrlMeas {
    temperature: Oversampling,
    pressure: Oversampling,
    mode: Mode,
}

impl CtrlMeas {
    pub fn new() -> Self {
        0u8.into()
    }

    pub async fn read<I: I2c, D: DelayNs>(
        address: I2cAddress,
        bus: &mut RegisterBus<I, D>,
    ) -> Result<CtrlMeas, BusError> {
        Ok(bus.read_register(address, CTRL_MEAS).await?.into())
    }

    pub async fn write<I: I2c, D: DelayNs>(
        address: I2cAddress,
        bus: &mut RegisterBus<I, D>,
        reg: CtrlMeas,
    ) -> Result<(), BusError> {
        bus.write_register(address, CTRL_MEAS, reg.into()).await
    }

    pub async fn modify<I: I2c, D: DelayNs, F: FnOnce(&mut CtrlMeas)>(
        address: I2cAddress,
        bus: &mut RegisterBus<I, D>,
        modify: F,
    ) -> Result<(), BusError> {
        let mut reg = Self::read(address, bus).await?;
        modify(&mut reg);
        Self::write(address, bus, reg).await
    }

    pub fn temperature(&mut self, oversampling: Oversampling) -> &mut Self {
        self.temperature = oversampling;
        self
    }

    pub fn pressure(&mut self, oversampling: Oversampling) -> &mut Self {
        self.pressure = oversampling;
        self
    }

    pub fn mode(&mut self, mode: Mode) -> &mut Self {
        self.mode = mode;
        self
    }
}

impl Default for CtrlMeas {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u8> for Oversampling {
    fn from(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Oversampling::Skipped,
            0b001 => Oversampling::X1,
            0b010 => Oversampling::X2,
            0b011 => Oversampling::X4,
            0b100 => Oversampling::X8,
            _ => Oversampling::X16,
        }
    }
}

impl From<Oversampling> for u8 {
    fn from(oversampling: Oversampling) -> Self {
        match oversampling {
            Oversampling::Skipped => 0b000,
            Oversampling::X1 => 0b001,
            Oversampling::X2 => 0b010,
            Oversampling::X4 => 0b011,
            Oversampling::X8 => 0b100,
            Oversampling::X16 => 0b101,
        }
    }
}

impl From<u8> for Mode {
    fn from(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Mode::Sleep,
            0b11 => Mode::Normal,
            _ => Mode::Forced,
        }
    }
}

impl From<Mode> for u8 {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Sleep => 0b00,
            Mode::Forced => 0b01,
            Mode::Normal => 0b11,
        }
    }
}

impl From<u8> for CtrlMeas {
    fn from(reg: u8) -> Self {
        CtrlMeas {
            temperature: (reg >> 5).into(),
            pressure: (reg >> 2).into(),
            mode: reg.into(),
        }
    }
}

impl From<CtrlMeas> for u8 {
    fn from(reg: CtrlMeas) -> u8 {
        (u8::from(reg.temperature) << 5) | (u8::from(reg.pressure) << 2) | u8::from(reg.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_mode_single_oversampling() {
        let mut reg = CtrlMeas::new();
        reg.temperature(Oversampling::X1)
            .pressure(Oversampling::X1)
            .mode(Mode::Normal);
        assert_eq!(0x27, u8::from(reg));
    }

    #[test]
    fn decode_register() {
        let reg: CtrlMeas = 0b101_011_01.into();
        let mut expected = CtrlMeas::new();
        expected
            .temperature(Oversampling::X16)
            .pressure(Oversampling::X4)
            .mode(Mode::Forced);
        assert_eq!(expected, reg);
    }
}
