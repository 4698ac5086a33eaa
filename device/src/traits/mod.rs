pub mod classifier;
pub mod i2c;

pub use classifier::RainClassifier;
pub use i2c::I2cAddress;
