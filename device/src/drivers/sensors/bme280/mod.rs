//! Bosch BME280 combined pressure, temperature and humidity sensor.

pub mod register;

use crate::domain::reading::{RawSample, Reading};
use crate::drivers::bus::{BusError, BusErrorCode, RegisterBus};
use crate::traits::i2c::I2cAddress;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use register::calibration::CalibrationSet;
use register::config::{Config, Filter, Standby};
use register::ctrl_hum::CtrlHum;
use register::ctrl_meas::{CtrlMeas, Mode, Oversampling};
use register::data::Data;
use register::id::ChipId;
use register::reset::Reset;
use register::status::Status;

/// SDO strapped to GND.
pub const PRIMARY_ADDR: u8 = 0x76;
/// SDO strapped to VDDIO.
pub const SECONDARY_ADDR: u8 = 0x77;

pub const CANDIDATE_ADDRESSES: [I2cAddress; 2] = [
    I2cAddress::new(PRIMARY_ADDR),
    I2cAddress::new(SECONDARY_ADDR),
];

// 2 ms startup time per datasheet
const NVM_COPY_POLL_MS: u32 = 2;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bme280Error {
    /// No candidate address acknowledged.
    DeviceNotFound,
    /// Something answered, but with a chip id we do not drive.
    UnexpectedDevice(u8),
    CalibrationRead(BusError),
    NotCalibrated,
    Bus(BusError),
}

impl From<BusError> for Bme280Error {
    fn from(e: BusError) -> Bme280Error {
        Bme280Error::Bus(e)
    }
}

pub struct Bme280<I, D>
where
    I: I2c,
    D: DelayNs,
{
    bus: RegisterBus<I, D>,
    address: Option<I2cAddress>,
    calibration: Option<CalibrationSet>,
}

impl<I, D> Bme280<I, D>
where
    I: I2c,
    D: DelayNs,
{
    pub fn new(bus: RegisterBus<I, D>) -> Self {
        Self {
            bus,
            address: None,
            calibration: None,
        }
    }

    /// Locates, verifies, resets, calibrates and configures the sensor.
    ///
    /// Any error leaves the driver uncalibrated; the node must not sample it.
    pub async fn initialize(&mut self) -> Result<(), Bme280Error> {
        self.address = None;
        self.calibration = None;

        let address = self
            .bus
            .probe(&CANDIDATE_ADDRESSES)
            .await
            .ok_or(Bme280Error::DeviceNotFound)?;

        let id = ChipId::read(address, &mut self.bus).await?;
        if !id.is_known() {
            error!("unexpected chip id {:?} at {:?}", id.value(), address);
            return Err(Bme280Error::UnexpectedDevice(id.value()));
        }

        Reset::soft_reset(address, &mut self.bus).await?;
        self.wait_nvm_copied(address).await?;

        let calibration = CalibrationSet::read(address, &mut self.bus)
            .await
            .map_err(Bme280Error::CalibrationRead)?;
        debug!("calibration: {:?}", calibration);

        // ctrl_hum latches on the following ctrl_meas write
        CtrlHum::modify(address, &mut self.bus, |reg| {
            reg.humidity(Oversampling::X1);
        })
        .await?;

        let mut ctrl_meas = CtrlMeas::new();
        ctrl_meas
            .temperature(Oversampling::X1)
            .pressure(Oversampling::X1)
            .mode(Mode::Normal);
        CtrlMeas::write(address, &mut self.bus, ctrl_meas).await?;

        let mut config = Config::new();
        config.standby(Standby::Ms1000).filter(Filter::Off);
        Config::write(address, &mut self.bus, config).await?;

        self.address.replace(address);
        self.calibration.replace(calibration);
        info!("BME280 ready at {:?}", address);
        Ok(())
    }

    pub fn address(&self) -> Option<I2cAddress> {
        self.address
    }

    pub fn calibration(&self) -> Option<&CalibrationSet> {
        self.calibration.as_ref()
    }

    /// Reads all measurement registers in a single burst.
    pub async fn read_raw(&mut self) -> Result<RawSample, Bme280Error> {
        let address = self.address.ok_or(Bme280Error::NotCalibrated)?;
        Ok(Data::read(address, &mut self.bus).await?)
    }

    pub async fn read(&mut self) -> Result<Reading, Bme280Error> {
        if let Some(calibration) = &self.calibration {
            let address = self.address.ok_or(Bme280Error::NotCalibrated)?;
            let raw = Data::read(address, &mut self.bus).await?;
            Ok(calibration.compensate(raw))
        } else {
            Err(Bme280Error::NotCalibrated)
        }
    }

    pub fn release(self) -> RegisterBus<I, D> {
        self.bus
    }

    async fn wait_nvm_copied(&mut self, address: I2cAddress) -> Result<(), Bme280Error> {
        let polls = self.bus.retry_policy().attempts.max(1);
        for _ in 0..polls {
            self.bus.delay_ms(NVM_COPY_POLL_MS).await;
            if !Status::read(address, &mut self.bus).await?.im_update() {
                return Ok(());
            }
        }
        warn!("NVM copy still running at {:?}", address);
        Err(Bme280Error::Bus(BusError::new(BusErrorCode::Timeout)))
    }
}
