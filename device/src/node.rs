//! Wiring of sensor, window, gate, units and link into one running node.

use crate::actors::{Aggregator, Sampler};
use crate::drivers::bus::RegisterBus;
use crate::drivers::sensors::bme280::{Bme280, Bme280Error};
use crate::drivers::serial::framer::OutputFramer;
use crate::gate::StartGate;
use crate::traits::classifier::RainClassifier;
use crate::window::SampleWindow;
use crate::NodeConfig;
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use embedded_io_async::Write;

/// Why a node stopped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeError {
    /// Bring-up failed; nothing was sampled or sent.
    Sensor(Bme280Error),
    /// The sensor stopped answering after having been brought up.
    DeviceLost,
}

impl From<Bme280Error> for NodeError {
    fn from(e: Bme280Error) -> Self {
        NodeError::Sensor(e)
    }
}

pub struct Node<'a, M, I, D, W, C, const N: usize>
where
    M: RawMutex,
    I: I2c,
    D: DelayNs,
    W: Write,
    C: RainClassifier,
{
    sensor: Bme280<I, D>,
    window: &'a SampleWindow<M, N>,
    gate: &'a StartGate<M>,
    framer: OutputFramer<W>,
    classifier: C,
    config: NodeConfig,
}

impl<'a, M, I, D, W, C, const N: usize> Node<'a, M, I, D, W, C, N>
where
    M: RawMutex,
    I: I2c,
    D: DelayNs,
    W: Write,
    C: RainClassifier,
{
    pub fn new(
        i2c: I,
        delay: D,
        sink: W,
        classifier: C,
        window: &'a SampleWindow<M, N>,
        gate: &'a StartGate<M>,
        config: NodeConfig,
    ) -> Self {
        debug_assert!(config.is_valid(), "invalid node configuration");
        Self {
            sensor: Bme280::new(RegisterBus::new(i2c, delay, config.retry)),
            window,
            gate,
            framer: OutputFramer::new(sink),
            classifier,
            config,
        }
    }

    /// Brings the sensor up, opens the gate and runs both units until the
    /// sensor is lost.
    ///
    /// If bring-up fails the gate stays closed and the error is returned
    /// before any unit was started.
    pub async fn run(self) -> NodeError {
        let Node {
            mut sensor,
            window,
            gate,
            framer,
            classifier,
            config,
        } = self;

        if let Err(e) = sensor.initialize().await {
            error!("sensor bring-up failed: {:?}", e);
            return e.into();
        }

        let mut sampler = Sampler::new(sensor, window, gate, &config);
        let mut aggregator = Aggregator::new(window, gate, framer, classifier, &config);

        gate.open();
        match select(sampler.run(), aggregator.run()).await {
            Either::First(e) => e,
            Either::Second(never) => match never {},
        }
    }
}
