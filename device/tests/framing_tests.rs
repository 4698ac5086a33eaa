#[cfg(feature = "std")]
mod tests {
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embedded_io_async::ErrorKind;
    use futures::executor::block_on;
    use rain_node::domain::record::RecordError;
    use rain_node::domain::{AggregateRecord, RuleTable};
    use rain_node::drivers::bus::RetryPolicy;
    use rain_node::drivers::sensors::bme280::Bme280Error;
    use rain_node::drivers::serial::{FramerError, LineAssembler, LineEvent, OutputFramer};
    use rain_node::testutil::*;
    use rain_node::{Node, NodeConfig, NodeError, SampleWindow, StartGate};

    #[test]
    fn framed_record_reassembles() {
        let sink = RecordingSink::new();
        let mut framer = OutputFramer::new(sink.clone());
        let sent = AggregateRecord::new(18.25, 1012.5, 72.75, 30.0);

        let n = block_on(framer.send(&sent)).unwrap();
        assert_eq!(sink.bytes().len(), n);
        assert_eq!(1, sink.flushes());

        let mut assembler: LineAssembler = LineAssembler::new();
        let mut received = Vec::new();
        for b in sink.bytes() {
            if let LineEvent::Ready = assembler.push(b) {
                received.push(AggregateRecord::decode(assembler.line().unwrap()).unwrap());
            }
        }
        assert_eq!(vec![sent], received);
    }

    #[test]
    fn garbage_between_records_is_discarded() {
        let mut assembler: LineAssembler<64> = LineAssembler::new();
        let stream = b"boot banner\r\n{\"temp\":1.00,\"press\":990.00,\"hum\":80.00,\"rain\":85.00}\n";

        let mut results = Vec::new();
        for &b in stream.iter() {
            if let LineEvent::Ready = assembler.push(b) {
                results.push(AggregateRecord::decode(assembler.line().unwrap()));
            }
        }
        assert_eq!(
            vec![
                Err(RecordError::Malformed),
                Ok(AggregateRecord::new(1.0, 990.0, 80.0, 85.0)),
            ],
            results
        );
    }

    #[test]
    fn broken_link_abandons_record() {
        let sink = RecordingSink::new();
        sink.fail_after(5);
        let mut framer = OutputFramer::new(sink.clone());

        let result = block_on(framer.send(&AggregateRecord::new(1.0, 2.0, 3.0, 4.0)));
        assert_eq!(Err(FramerError::Transport(ErrorKind::BrokenPipe)), result);
        assert_eq!(b"{\"tem".to_vec(), sink.bytes());
        assert_eq!(0, sink.flushes());
    }

    #[test]
    fn oversized_record_is_not_sent() {
        let sink = RecordingSink::new();
        let mut framer = OutputFramer::new(sink.clone());

        let result = block_on(framer.send(&AggregateRecord::new(-f32::MAX, -f32::MAX, -f32::MAX, 0.0)));
        assert_eq!(Err(FramerError::Format), result);
        assert!(sink.bytes().is_empty());
        assert_eq!(0, sink.flushes());
    }

    #[test]
    fn node_without_sensor_never_opens_gate() {
        let _ = env_logger::builder().is_test(true).try_init();
        let window: SampleWindow<NoopRawMutex, 4> = SampleWindow::new();
        let gate = StartGate::new();
        let sink = RecordingSink::new();
        let node = Node::new(
            FakeBme280::absent(),
            NoopDelay::new(),
            sink.clone(),
            RuleTable::new(),
            &window,
            &gate,
            NodeConfig::new().with_retry(RetryPolicy::once()),
        );

        assert_eq!(
            NodeError::Sensor(Bme280Error::DeviceNotFound),
            block_on(node.run())
        );
        assert!(!gate.is_open());
        assert_eq!(0, gate.released());
        assert!(sink.bytes().is_empty());
    }

    #[test]
    fn node_reports_unexpected_device() {
        let window: SampleWindow<NoopRawMutex, 4> = SampleWindow::new();
        let gate = StartGate::new();
        let sink = RecordingSink::new();
        let node = Node::new(
            FakeBme280::new().with_chip_id(0x58),
            NoopDelay::new(),
            sink.clone(),
            RuleTable::new(),
            &window,
            &gate,
            NodeConfig::default(),
        );

        assert_eq!(
            NodeError::Sensor(Bme280Error::UnexpectedDevice(0x58)),
            block_on(node.run())
        );
        assert!(!gate.is_open());
        assert!(sink.bytes().is_empty());
    }
}
