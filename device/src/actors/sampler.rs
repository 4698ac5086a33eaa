use crate::domain::reading::Reading;
use crate::drivers::sensors::bme280::{Bme280, Bme280Error};
use crate::gate::StartGate;
use crate::node::NodeError;
use crate::window::SampleWindow;
use crate::NodeConfig;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Ticker};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplerState {
    Idle,
    Reading,
    Converting,
    Appending,
}

/// Result of one successful sampling cycle.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleOutcome {
    Appended(Reading),
    /// The window was full; the reading was discarded.
    Dropped(Reading),
    /// Compensation signalled that pressure is not available yet.
    NotReady,
}

/// Periodically reads the sensor and feeds the sample window.
pub struct Sampler<'a, M, I, D, const N: usize>
where
    M: RawMutex,
    I: I2c,
    D: DelayNs,
{
    sensor: Bme280<I, D>,
    window: &'a SampleWindow<M, N>,
    gate: &'a StartGate<M>,
    period: Duration,
    loss_threshold: u32,
    failures: u32,
    state: SamplerState,
}

impl<'a, M, I, D, const N: usize> Sampler<'a, M, I, D, N>
where
    M: RawMutex,
    I: I2c,
    D: DelayNs,
{
    /// `sensor` is expected to be initialized already.
    pub fn new(
        sensor: Bme280<I, D>,
        window: &'a SampleWindow<M, N>,
        gate: &'a StartGate<M>,
        config: &NodeConfig,
    ) -> Self {
        Self {
            sensor,
            window,
            gate,
            period: config.sample_period,
            loss_threshold: config.device_loss_threshold,
            failures: 0,
            state: SamplerState::Idle,
        }
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    /// Failed cycles since the last successful read.
    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    /// Runs a single read, compensate and append cycle.
    ///
    /// A failed read skips the cycle and leaves the window untouched.
    pub async fn sample_once(&mut self) -> Result<SampleOutcome, Bme280Error> {
        let result = self.cycle().await;
        self.state = SamplerState::Idle;
        match &result {
            Ok(_) => self.failures = 0,
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                warn!("sampling cycle skipped: {:?}", e);
            }
        }
        result
    }

    /// Samples every period until the sensor is lost. Never returns before
    /// the gate opens.
    pub async fn run(&mut self) -> NodeError {
        self.gate.wait().await;
        info!("sampling every {} ms", self.period.as_millis());
        let mut ticker = Ticker::every(self.period);
        loop {
            if self.sample_once().await.is_err()
                && self.loss_threshold > 0
                && self.failures >= self.loss_threshold
            {
                error!("sensor lost after {} failed cycles", self.failures);
                return NodeError::DeviceLost;
            }
            ticker.next().await;
        }
    }

    pub fn release(self) -> Bme280<I, D> {
        self.sensor
    }

    async fn cycle(&mut self) -> Result<SampleOutcome, Bme280Error> {
        self.state = SamplerState::Reading;
        let raw = self.sensor.read_raw().await?;

        self.state = SamplerState::Converting;
        let calibration = self.sensor.calibration().ok_or(Bme280Error::NotCalibrated)?;
        let reading = calibration.compensate(raw);
        trace!("sample: {:?}", reading);
        if !reading.pressure_ready() {
            debug!("pressure not ready, sample discarded");
            return Ok(SampleOutcome::NotReady);
        }

        self.state = SamplerState::Appending;
        if self.window.append(reading).await {
            Ok(SampleOutcome::Appended(reading))
        } else {
            warn!("sample window full, dropping newest reading");
            Ok(SampleOutcome::Dropped(reading))
        }
    }
}
