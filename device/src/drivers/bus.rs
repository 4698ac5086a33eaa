//! Register-addressed transactions over a shared I2C bus.
//!
//! Every transaction except the presence probe is retried according to a
//! [`RetryPolicy`]; whether an exhausted retry is fatal is up to the caller.

use crate::traits::i2c::I2cAddress;
use embedded_hal::i2c::{Error as _, ErrorKind};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

/// Transport failure reported by the bus.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusErrorCode {
    /// The addressed device did not acknowledge.
    Nack,
    /// The transfer did not complete.
    Timeout,
    /// Another controller held the bus or arbitration was lost.
    Busy,
}

impl From<ErrorKind> for BusErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(_) => BusErrorCode::Nack,
            ErrorKind::ArbitrationLoss | ErrorKind::Bus => BusErrorCode::Busy,
            _ => BusErrorCode::Timeout,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusError {
    pub code: BusErrorCode,
}

impl BusError {
    pub const fn new(code: BusErrorCode) -> Self {
        Self { code }
    }
}

impl From<ErrorKind> for BusError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind.into())
    }
}

/// Upper bound for [`RetryPolicy::attempts`] in a valid node configuration.
pub const MAX_ATTEMPTS: u8 = 5;

/// How often a failed transaction is attempted and how long to wait in between.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Zero behaves like one; more
    /// than [`MAX_ATTEMPTS`] is rejected by `NodeConfig::is_valid`.
    pub attempts: u8,
    pub delay_ms: u32,
}

impl RetryPolicy {
    pub const fn new(attempts: u8, delay_ms: u32) -> Self {
        Self { attempts, delay_ms }
    }

    /// A single attempt, no waiting.
    pub const fn once() -> Self {
        Self::new(1, 0)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, 10)
    }
}

pub struct RegisterBus<I, D>
where
    I: I2c,
    D: DelayNs,
{
    i2c: I,
    delay: D,
    retry: RetryPolicy,
}

impl<I, D> RegisterBus<I, D>
where
    I: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I, delay: D, retry: RetryPolicy) -> Self {
        Self { i2c, delay, retry }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Returns the first candidate that acknowledges a zero-length write.
    ///
    /// Each candidate is tried exactly once; a NACK here means "not present",
    /// not a transient failure.
    pub async fn probe(&mut self, candidates: &[I2cAddress]) -> Option<I2cAddress> {
        for &address in candidates {
            match self.i2c.write(address.into(), &[]).await {
                Ok(()) => {
                    debug!("device acknowledged at {:?}", address);
                    return Some(address);
                }
                Err(e) => {
                    let code: BusErrorCode = e.kind().into();
                    debug!("no device at {:?}: {:?}", address, code);
                }
            }
        }
        None
    }

    pub async fn read_register(
        &mut self,
        address: I2cAddress,
        register: u8,
    ) -> Result<u8, BusError> {
        let [value] = self.burst_read::<1>(address, register).await?;
        Ok(value)
    }

    pub async fn write_register(
        &mut self,
        address: I2cAddress,
        register: u8,
        value: u8,
    ) -> Result<(), BusError> {
        self.transfer(address, &[register, value], &mut []).await
    }

    /// Reads `N` consecutive registers starting at `start` in one transaction.
    ///
    /// The bytes are only handed out once the whole transfer succeeded, so a
    /// failed or retried transfer never leaks a partial snapshot.
    pub async fn burst_read<const N: usize>(
        &mut self,
        address: I2cAddress,
        start: u8,
    ) -> Result<[u8; N], BusError> {
        let mut buf = [0; N];
        self.transfer(address, &[start], &mut buf).await?;
        Ok(buf)
    }

    /// Waits on the bus' delay source, e.g. while the device is busy.
    pub async fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms).await
    }

    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    async fn transfer(
        &mut self,
        address: I2cAddress,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), BusError> {
        let attempts = self.retry.attempts.max(1);
        let mut attempt = 1;
        loop {
            let result = if read.is_empty() {
                self.i2c.write(address.into(), write).await
            } else {
                self.i2c.write_read(address.into(), write, read).await
            };

            match result {
                Ok(()) => return Ok(()),
                Err(e) => {
                    let error = BusError::from(e.kind());
                    if attempt >= attempts {
                        return Err(error);
                    }
                    warn!(
                        "bus transfer to {:?} failed ({:?}), attempt {} of {}",
                        address,
                        error.code,
                        attempt,
                        attempts
                    );
                    attempt += 1;
                    self.delay.delay_ms(self.retry.delay_ms).await;
                }
            }
        }
    }
}
