use crate::drivers::bus::{BusError, RegisterBus};
use crate::traits::i2c::I2cAddress;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

const CONFIG: u8 = 0xF5;

/// Inactive time between two conversions in normal mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Standby {
    Us500,
    Ms62p5,
    Ms125,
    Ms250,
    Ms500,
    Ms1000,
    Ms10,
    Ms20,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Filter {
    Off,
    X2,
    X4,
    X8,
    X16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    standby: Standby,
    filter: Filter,
    spi3w: bool,
}

impl Config {
    pub fn new() -> Self {
        0u8.into()
    }

    pub async fn read<I: I2c, D: DelayNs>(
        address: I2cAddress,
        bus: &mut RegisterBus<I, D>,
    ) -> Result<Config, BusError> {
        Ok(bus.read_register(address, CONFIG).await?.into())
    }

    /// Only honoured in sleep mode; writes in normal mode may be ignored.
    pub async fn write<I: I2c, D: DelayNs>(
        address: I2cAddress,
        bus: &mut RegisterBus<I, D>,
        reg: Config,
    ) -> Result<(), BusError> {
        bus.write_register(address, CONFIG, reg.into()).await
    }

    pub fn standby(&mut self, standby: Standby) -> &mut Self {
        self.standby = standby;
        self
    }

    pub fn filter(&mut self, filter: Filter) -> &mut Self {
        self.filter = filter;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u8> for Standby {
    fn from(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Standby::Us500,
            0b001 => Standby::Ms62p5,
            0b010 => Standby::Ms125,
            0b011 => Standby::Ms250,
            0b100 => Standby::Ms500,
            0b101 => Standby::Ms1000,
            0b110 => Standby::Ms10,
            _ => Standby::Ms20,
        }
    }
}

impl From<Standby> for u8 {
    fn from(standby: Standby) -> Self {
        match standby {
            Standby::Us500 => 0b000,
            Standby::Ms62p5 => 0b001,
            Standby::Ms125 => 0b010,
            Standby::Ms250 => 0b011,
            Standby::Ms500 => 0b100,
            Standby::Ms1000 => 0b101,
            Standby::Ms10 => 0b110,
            Standby::Ms20 => 0b111,
        }
    }
}

impl From<u8> for Filter {
    fn from(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Filter::Off,
            0b001 => Filter::X2,
            0b010 => Filter::X4,
            0b011 => Filter::X8,
            _ => Filter::X16,
        }
    }
}

impl From<Filter> for u8 {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Off => 0b000,
            Filter::X2 => 0b001,
            Filter::X4 => 0b010,
            Filter::X8 => 0b011,
            Filter::X16 => 0b100,
        }
    }
}

impl From<u8> for Config {
    fn from(reg: u8) -> Self {
        Config {
            standby: (reg >> 5).into(),
            filter: (reg >> 2).into(),
            spi3w: (reg & 0b1) != 0,
        }
    }
}

impl From<Config> for u8 {
    fn from(reg: Config) -> u8 {
        (u8::from(reg.standby) << 5) | (u8::from(reg.filter) << 2) | u8::from(reg.spi3w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_second_standby_without_filter() {
        let mut reg = Config::new();
        reg.standby(Standby::Ms1000).filter(Filter::Off);
        assert_eq!(0xA0, u8::from(reg));
    }
}
