use core::convert::Infallible;
use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Delay, Duration, Timer};
use embedded_io_async::{ErrorType, Write};
use rain_node::actors::{Aggregator, Sampler};
use rain_node::domain::{AggregateRecord, RawSample, RuleTable};
use rain_node::drivers::bus::RegisterBus;
use rain_node::drivers::sensors::bme280::Bme280;
use rain_node::drivers::serial::{LineAssembler, LineEvent, OutputFramer};
use rain_node::testutil::FakeBme280;
use rain_node::{NodeConfig, SampleWindow, StartGate, DEFAULT_WINDOW_CAPACITY};

type NodeMutex = CriticalSectionRawMutex;

const SAMPLE_PERIOD_MS: u64 = rain_node::config!("sample-period-ms", 1000);
const AGGREGATE_PERIOD_MS: u64 = rain_node::config!("aggregate-period-ms", 6000);

static WINDOW: SampleWindow<NodeMutex, DEFAULT_WINDOW_CAPACITY> = SampleWindow::new();
static GATE: StartGate<NodeMutex> = StartGate::new();

/// Receiving end of the serial link, fed directly by the framer.
struct Loopback {
    assembler: LineAssembler,
}

impl Loopback {
    fn new() -> Self {
        Self {
            assembler: LineAssembler::new(),
        }
    }
}

impl ErrorType for Loopback {
    type Error = Infallible;
}

impl Write for Loopback {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for &b in buf {
            if let LineEvent::Ready = self.assembler.push(b) {
                match self.assembler.line().map(AggregateRecord::decode) {
                    Some(Ok(record)) => log::info!(
                        "relay: {} °C, {} hPa, {} %RH, rain {} %",
                        record.temperature,
                        record.pressure,
                        record.humidity,
                        record.rain_probability
                    ),
                    Some(Err(e)) => log::warn!("relay: dropping line: {:?}", e),
                    None => {}
                }
            }
        }
        Ok(buf.len())
    }
}

#[embassy_executor::task]
async fn sampler_task(mut sampler: Sampler<'static, NodeMutex, FakeBme280, Delay, DEFAULT_WINDOW_CAPACITY>) {
    let reason = sampler.run().await;
    log::error!("node stopped: {:?}", reason);
    std::process::exit(1);
}

#[embassy_executor::task]
async fn aggregator_task(
    mut aggregator: Aggregator<'static, NodeMutex, Loopback, RuleTable, DEFAULT_WINDOW_CAPACITY>,
) {
    match aggregator.run().await {}
}

/// Slowly raises the simulated humidity so the rain estimate moves.
#[embassy_executor::task]
async fn weather_task(sensor: FakeBme280) {
    const HUMIDITY_STEPS: [i32; 4] = [23146, 30000, 36000, 42000];
    let mut step = 0;
    loop {
        Timer::after(Duration::from_millis(AGGREGATE_PERIOD_MS * 2)).await;
        step = (step + 1) % HUMIDITY_STEPS.len();
        sensor.set_raw(RawSample::new(415493, 519888, HUMIDITY_STEPS[step]));
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_nanos()
        .init();

    let config = NodeConfig::new()
        .with_sample_period(Duration::from_millis(SAMPLE_PERIOD_MS))
        .with_aggregate_period(Duration::from_millis(AGGREGATE_PERIOD_MS));

    let bus = FakeBme280::new();
    let mut sensor = Bme280::new(RegisterBus::new(bus.clone(), Delay, config.retry));
    if let Err(e) = sensor.initialize().await {
        log::error!("sensor bring-up failed: {:?}", e);
        std::process::exit(1);
    }

    let sampler = Sampler::new(sensor, &WINDOW, &GATE, &config);
    let aggregator = Aggregator::new(
        &WINDOW,
        &GATE,
        OutputFramer::new(Loopback::new()),
        RuleTable::new(),
        &config,
    );

    spawner.spawn(sampler_task(sampler)).unwrap();
    spawner.spawn(aggregator_task(aggregator)).unwrap();
    spawner.spawn(weather_task(bus)).unwrap();

    GATE.open();
}
