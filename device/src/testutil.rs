//! Host-side doubles for the sensor bus, the delay source and the serial link.
//!
//! All doubles are cheap handles over shared state: clone one before handing
//! it to the code under test and keep the clone to inspect or inject faults.

use crate::domain::reading::RawSample;
use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use embedded_io_async::Write;
use std::string::String;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::vec::Vec;

/// Trimming values of a real part (temperature and pressure from the
/// datasheet example), laid out as in registers 0x88..=0x9F.
pub const CALIBRATION_TP: [u8; 24] = [
    0x70, 0x6B, 0x43, 0x67, 0x18, 0xFC, 0x7D, 0x8E, 0x43, 0xD6, 0xD0, 0x0B, 0x27, 0x0B, 0x8C, 0x00,
    0xF9, 0xFF, 0x8C, 0x3C, 0xF8, 0xC6, 0x70, 0x17,
];
/// Register 0xA1.
pub const CALIBRATION_H1: u8 = 0x4B;
/// Registers 0xE1..=0xE7.
pub const CALIBRATION_H: [u8; 7] = [0x6A, 0x01, 0x00, 0x13, 0x29, 0x03, 0x1E];

/// Measurement burst 0xF7..=0xFE: about 25.08 °C, 1005.94 hPa, 16.66 %RH
/// with the calibration above.
pub const DEFAULT_BURST: [u8; 8] = [0x65, 0x70, 0x50, 0x7E, 0xED, 0x00, 0x5A, 0x6A];

const REG_ID: u8 = 0xD0;
const REG_RESET: u8 = 0xE0;
const REG_STATUS: u8 = 0xF3;
const REG_DATA: u8 = 0xF7;

struct FakeState {
    address: u8,
    present: bool,
    registers: [u8; 256],
    pointer: u8,
    fail_next: usize,
    fail_always: bool,
    fail_reads_from: Option<u8>,
    nvm_busy_reads: usize,
    transactions: usize,
    writes: Vec<(u8, u8)>,
    resets: usize,
}

impl FakeState {
    fn read(&mut self) -> u8 {
        let register = self.pointer;
        self.pointer = self.pointer.wrapping_add(1);
        if register == REG_STATUS && self.nvm_busy_reads > 0 {
            self.nvm_busy_reads -= 1;
            return self.registers[register as usize] | 0x01;
        }
        self.registers[register as usize]
    }

    fn write(&mut self, register: u8, value: u8) {
        self.writes.push((register, value));
        if register == REG_RESET {
            if value == 0xB6 {
                self.resets += 1;
            }
            return;
        }
        self.registers[register as usize] = value;
    }
}

/// Register-level BME280 stand-in on an I2C bus.
#[derive(Clone)]
pub struct FakeBme280 {
    state: Arc<Mutex<FakeState>>,
}

impl Default for FakeBme280 {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBme280 {
    /// A calibrated part at 0x76 reporting [`DEFAULT_BURST`].
    pub fn new() -> Self {
        Self::at(0x76)
    }

    pub fn at(address: u8) -> Self {
        let mut registers = [0u8; 256];
        registers[REG_ID as usize] = 0x60;
        registers[0x88..0x88 + CALIBRATION_TP.len()].copy_from_slice(&CALIBRATION_TP);
        registers[0xA1] = CALIBRATION_H1;
        registers[0xE1..0xE1 + CALIBRATION_H.len()].copy_from_slice(&CALIBRATION_H);
        registers[REG_DATA as usize..REG_DATA as usize + DEFAULT_BURST.len()]
            .copy_from_slice(&DEFAULT_BURST);
        Self {
            state: Arc::new(Mutex::new(FakeState {
                address,
                present: true,
                registers,
                pointer: 0,
                fail_next: 0,
                fail_always: false,
                fail_reads_from: None,
                nvm_busy_reads: 0,
                transactions: 0,
                writes: Vec::new(),
                resets: 0,
            })),
        }
    }

    /// Nothing on the bus acknowledges.
    pub fn absent() -> Self {
        let fake = Self::new();
        fake.state.lock().unwrap().present = false;
        fake
    }

    pub fn with_chip_id(self, id: u8) -> Self {
        self.set_register(REG_ID, id);
        self
    }

    pub fn set_register(&self, register: u8, value: u8) {
        self.state.lock().unwrap().registers[register as usize] = value;
    }

    pub fn register(&self, register: u8) -> u8 {
        self.state.lock().unwrap().registers[register as usize]
    }

    /// Loads a measurement burst as the device would latch it.
    pub fn set_raw(&self, raw: RawSample) {
        let p = raw.pressure << 4;
        let t = raw.temperature << 4;
        let burst = [
            (p >> 16) as u8,
            (p >> 8) as u8,
            p as u8,
            (t >> 16) as u8,
            (t >> 8) as u8,
            t as u8,
            (raw.humidity >> 8) as u8,
            raw.humidity as u8,
        ];
        let mut state = self.state.lock().unwrap();
        state.registers[REG_DATA as usize..REG_DATA as usize + 8].copy_from_slice(&burst);
    }

    /// Fails the next `n` transactions, probes included.
    pub fn fail_next(&self, n: usize) {
        self.state.lock().unwrap().fail_next = n;
    }

    /// Fails every transaction after the presence probe.
    pub fn fail_always(&self, fail: bool) {
        self.state.lock().unwrap().fail_always = fail;
    }

    /// Fails every read that starts at `register`.
    pub fn fail_reads_from(&self, register: u8) {
        self.state.lock().unwrap().fail_reads_from.replace(register);
    }

    /// Reports the NVM copy as running for the next `reads` status reads.
    pub fn nvm_busy_for(&self, reads: usize) {
        self.state.lock().unwrap().nvm_busy_reads = reads;
    }

    pub fn transactions(&self) -> usize {
        self.state.lock().unwrap().transactions
    }

    /// Every `(register, value)` written, in order.
    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn resets(&self) -> usize {
        self.state.lock().unwrap().resets
    }
}

impl ErrorType for FakeBme280 {
    type Error = ErrorKind;
}

impl I2c for FakeBme280 {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut state = self.state.lock().unwrap();
        state.transactions += 1;

        if !state.present || address != state.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(ErrorKind::Other);
        }
        let probe = operations
            .iter()
            .all(|op| matches!(op, Operation::Write(bytes) if bytes.is_empty()));
        if state.fail_always && !probe {
            return Err(ErrorKind::Other);
        }
        if let Some(register) = state.fail_reads_from {
            let reads_from = matches!(operations.first(), Some(Operation::Write([first, ..])) if *first == register);
            let has_read = operations.iter().any(|op| matches!(op, Operation::Read(_)));
            if reads_from && has_read {
                return Err(ErrorKind::Other);
            }
        }

        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    if let Some((register, data)) = bytes.split_first() {
                        state.pointer = *register;
                        for (offset, value) in data.iter().enumerate() {
                            let target = register.wrapping_add(offset as u8);
                            state.write(target, *value);
                        }
                    }
                }
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = state.read();
                    }
                }
            }
        }
        Ok(())
    }
}

/// Delay source that returns immediately and remembers how long it was asked to wait.
#[derive(Clone, Default)]
pub struct NoopDelay {
    waited_ns: Arc<AtomicU64>,
    calls: Arc<AtomicUsize>,
}

impl NoopDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waited_ms(&self) -> u64 {
        self.waited_ns.load(Ordering::SeqCst) / 1_000_000
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DelayNs for NoopDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.waited_ns.fetch_add(ns as u64, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn delay_us(&mut self, us: u32) {
        self.waited_ns.fetch_add(us as u64 * 1_000, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.waited_ns.fetch_add(ms as u64 * 1_000_000, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct SinkState {
    bytes: Vec<u8>,
    accept: Option<usize>,
    flushes: usize,
}

/// Serial sink that records everything written to it.
#[derive(Clone, Default)]
pub struct RecordingSink {
    state: Arc<Mutex<SinkState>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `n` more bytes, then fails every write.
    pub fn fail_after(&self, n: usize) {
        self.state.lock().unwrap().accept.replace(n);
    }

    /// Accepts every write again.
    pub fn recover(&self) {
        self.state.lock().unwrap().accept.take();
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.state.lock().unwrap().bytes.clone()
    }

    /// Complete, newline-terminated lines received so far.
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.bytes();
        let text = String::from_utf8_lossy(&bytes);
        text.split_inclusive('\n')
            .filter(|l| l.ends_with('\n'))
            .map(|l| l.trim_end_matches('\n').into())
            .collect()
    }

    pub fn flushes(&self) -> usize {
        self.state.lock().unwrap().flushes
    }
}

impl embedded_io_async::ErrorType for RecordingSink {
    type Error = embedded_io_async::ErrorKind;
}

impl Write for RecordingSink {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut state = self.state.lock().unwrap();
        let n = match state.accept {
            Some(0) => return Err(embedded_io_async::ErrorKind::BrokenPipe),
            Some(left) => left.min(buf.len()),
            None => buf.len(),
        };
        if let Some(left) = state.accept.as_mut() {
            *left -= n;
        }
        state.bytes.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.state.lock().unwrap().flushes += 1;
        Ok(())
    }
}
