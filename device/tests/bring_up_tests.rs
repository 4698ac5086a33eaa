#[cfg(feature = "std")]
mod tests {
    use futures::executor::block_on;
    use rain_node::drivers::bus::{BusError, BusErrorCode, RegisterBus, RetryPolicy};
    use rain_node::drivers::sensors::bme280::{Bme280, Bme280Error};
    use rain_node::testutil::*;
    use rain_node::traits::i2c::I2cAddress;

    fn sensor(fake: &FakeBme280, delay: &NoopDelay) -> Bme280<FakeBme280, NoopDelay> {
        Bme280::new(RegisterBus::new(
            fake.clone(),
            delay.clone(),
            RetryPolicy::new(3, 10),
        ))
    }

    #[test]
    fn bring_up_at_primary_address() {
        let _ = env_logger::builder().is_test(true).try_init();
        let fake = FakeBme280::new();
        let delay = NoopDelay::new();
        let mut sensor = sensor(&fake, &delay);

        block_on(sensor.initialize()).unwrap();

        assert_eq!(Some(I2cAddress::new(0x76)), sensor.address());
        assert!(sensor.calibration().is_some());
        assert_eq!(1, fake.resets());
        // reset, then ctrl_hum before ctrl_meas, then config
        assert_eq!(
            vec![(0xE0, 0xB6), (0xF2, 0x01), (0xF4, 0x27), (0xF5, 0xA0)],
            fake.writes()
        );
    }

    #[test]
    fn bring_up_at_secondary_address() {
        let fake = FakeBme280::at(0x77);
        let delay = NoopDelay::new();
        let mut sensor = sensor(&fake, &delay);

        block_on(sensor.initialize()).unwrap();
        assert_eq!(Some(I2cAddress::new(0x77)), sensor.address());
    }

    #[test]
    fn absent_device_is_probed_once_per_address() {
        let fake = FakeBme280::absent();
        let delay = NoopDelay::new();
        let mut sensor = sensor(&fake, &delay);

        assert_eq!(Err(Bme280Error::DeviceNotFound), block_on(sensor.initialize()));
        assert_eq!(2, fake.transactions());
        assert_eq!(0, delay.calls());
        assert!(sensor.calibration().is_none());
    }

    #[test]
    fn unknown_chip_id() {
        let fake = FakeBme280::new().with_chip_id(0x58);
        let delay = NoopDelay::new();
        let mut sensor = sensor(&fake, &delay);

        assert_eq!(
            Err(Bme280Error::UnexpectedDevice(0x58)),
            block_on(sensor.initialize())
        );
        assert!(fake.writes().is_empty());
        assert!(sensor.address().is_none());
    }

    #[test]
    fn calibration_read_failure() {
        let fake = FakeBme280::new();
        fake.fail_reads_from(0x88);
        let delay = NoopDelay::new();
        let mut sensor = sensor(&fake, &delay);

        assert_eq!(
            Err(Bme280Error::CalibrationRead(BusError::new(BusErrorCode::Timeout))),
            block_on(sensor.initialize())
        );
        // nothing configured past the reset
        assert_eq!(vec![(0xE0, 0xB6)], fake.writes());
        // one status poll, then two retries
        assert_eq!(2 + 2 * 10, delay.waited_ms());
        assert!(sensor.calibration().is_none());
    }

    #[test]
    fn waits_for_nvm_copy() {
        let fake = FakeBme280::new();
        fake.nvm_busy_for(2);
        let delay = NoopDelay::new();
        let mut sensor = sensor(&fake, &delay);

        block_on(sensor.initialize()).unwrap();
        assert_eq!(3 * 2, delay.waited_ms());
    }

    #[test]
    fn nvm_copy_never_finishes() {
        let fake = FakeBme280::new();
        fake.nvm_busy_for(100);
        let delay = NoopDelay::new();
        let mut sensor = sensor(&fake, &delay);

        assert_eq!(
            Err(Bme280Error::Bus(BusError::new(BusErrorCode::Timeout))),
            block_on(sensor.initialize())
        );
    }

    #[test]
    fn read_before_bring_up() {
        let fake = FakeBme280::new();
        let delay = NoopDelay::new();
        let mut sensor = sensor(&fake, &delay);

        assert_eq!(Err(Bme280Error::NotCalibrated), block_on(sensor.read()));
        assert_eq!(0, fake.transactions());
    }

    #[test]
    fn compensated_read() {
        let fake = FakeBme280::new();
        let delay = NoopDelay::new();
        let mut sensor = sensor(&fake, &delay);
        block_on(sensor.initialize()).unwrap();

        let reading = block_on(sensor.read()).unwrap();
        assert!((reading.temperature - 25.08).abs() < 0.005);
        assert!((reading.pressure - 1005.937).abs() < 0.01);
        assert!((reading.humidity - 16.664).abs() < 0.01);
    }

    #[test]
    fn transient_read_failure_is_retried() {
        let fake = FakeBme280::new();
        let delay = NoopDelay::new();
        let mut sensor = sensor(&fake, &delay);
        block_on(sensor.initialize()).unwrap();
        let waited = delay.waited_ms();

        fake.fail_next(2);
        assert!(block_on(sensor.read()).is_ok());
        assert_eq!(waited + 2 * 10, delay.waited_ms());

        fake.fail_next(3);
        assert_eq!(
            Err(Bme280Error::Bus(BusError::new(BusErrorCode::Timeout))),
            block_on(sensor.read())
        );
    }
}
