use core::fmt::{Debug, Formatter, LowerHex, UpperHex};

/// A 7-bit address on an I2C bus.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct I2cAddress(u8);

impl I2cAddress {
    pub const fn new(val: u8) -> Self {
        Self(val)
    }

    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl From<I2cAddress> for u8 {
    fn from(address: I2cAddress) -> u8 {
        address.0
    }
}

impl From<u8> for I2cAddress {
    fn from(val: u8) -> I2cAddress {
        I2cAddress::new(val)
    }
}

impl Debug for I2cAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for I2cAddress {
    fn format(&self, f: defmt::Formatter<'_>) {
        defmt::write!(f, "0x{=u8:02x}", self.0)
    }
}

impl LowerHex for I2cAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        LowerHex::fmt(&self.0, f)
    }
}

impl UpperHex for I2cAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        UpperHex::fmt(&self.0, f)
    }
}
