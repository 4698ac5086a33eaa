use crate::domain::rain::clamp_score;
use crate::domain::record::AggregateRecord;
use crate::drivers::serial::framer::OutputFramer;
use crate::gate::StartGate;
use crate::traits::classifier::RainClassifier;
use crate::window::SampleWindow;
use crate::NodeConfig;
use core::convert::Infallible;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Ticker};
use embedded_io_async::Write;

/// Periodically drains the sample window, scores the means and transmits
/// the result.
pub struct Aggregator<'a, M, W, C, const N: usize>
where
    M: RawMutex,
    W: Write,
    C: RainClassifier,
{
    window: &'a SampleWindow<M, N>,
    gate: &'a StartGate<M>,
    framer: OutputFramer<W>,
    classifier: C,
    period: Duration,
    sent: u32,
}

impl<'a, M, W, C, const N: usize> Aggregator<'a, M, W, C, N>
where
    M: RawMutex,
    W: Write,
    C: RainClassifier,
{
    pub fn new(
        window: &'a SampleWindow<M, N>,
        gate: &'a StartGate<M>,
        framer: OutputFramer<W>,
        classifier: C,
        config: &NodeConfig,
    ) -> Self {
        Self {
            window,
            gate,
            framer,
            classifier,
            period: config.aggregate_period,
            sent: 0,
        }
    }

    /// Records handed to the link without error.
    pub fn sent(&self) -> u32 {
        self.sent
    }

    /// Drains the window and emits one record, unless the window was empty.
    ///
    /// A transmit failure loses the record; the window has been cleared either way.
    pub async fn aggregate_once(&mut self) -> Option<AggregateRecord> {
        let Some(means) = self.window.drain_means().await else {
            debug!("no samples in window, nothing to send");
            return None;
        };

        let rain = clamp_score(self.classifier.rain_probability(
            means.temperature,
            means.pressure,
            means.humidity,
        ));
        let record = AggregateRecord::new(means.temperature, means.pressure, means.humidity, rain);
        info!("aggregate over {} samples: {:?}", means.samples, record);

        match self.framer.send(&record).await {
            Ok(_) => self.sent = self.sent.wrapping_add(1),
            Err(e) => warn!("record not transmitted: {:?}", e),
        }
        Some(record)
    }

    /// Aggregates once per period, forever. The first aggregate happens one
    /// full period after the gate opens.
    pub async fn run(&mut self) -> Infallible {
        self.gate.wait().await;
        info!("aggregating every {} ms", self.period.as_millis());
        let mut ticker = Ticker::every(self.period);
        loop {
            ticker.next().await;
            self.aggregate_once().await;
        }
    }

    pub fn release(self) -> OutputFramer<W> {
        self.framer
    }
}
