//! Runtime tunables of the node.
//!
//! Build-time values can be pulled in with [`config!`](crate::config), e.g.
//!
//! ```ignore
//! const SAMPLE_MS: u64 = rain_node::config!("sample-period-ms", 10000);
//! let config = NodeConfig::new().with_sample_period(Duration::from_millis(SAMPLE_MS));
//! ```

use crate::drivers::bus::{RetryPolicy, MAX_ATTEMPTS};
use embassy_time::Duration;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeConfig {
    /// Interval between sensor reads.
    pub sample_period: Duration,
    /// Interval between aggregates; the sampling window spans this period.
    /// Must be longer than `sample_period`.
    pub aggregate_period: Duration,
    /// Applied to every bus transaction after the presence probe. At most
    /// `MAX_ATTEMPTS` attempts.
    pub retry: RetryPolicy,
    /// Consecutive failed sampling cycles after which the sensor counts as
    /// lost. Zero never gives up.
    pub device_loss_threshold: u32,
}

impl NodeConfig {
    pub const fn new() -> Self {
        Self {
            sample_period: Duration::from_secs(10),
            aggregate_period: Duration::from_secs(60),
            retry: RetryPolicy::new(5, 10),
            device_loss_threshold: 30,
        }
    }

    pub const fn with_sample_period(mut self, period: Duration) -> Self {
        self.sample_period = period;
        self
    }

    pub const fn with_aggregate_period(mut self, period: Duration) -> Self {
        self.aggregate_period = period;
        self
    }

    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub const fn with_device_loss_threshold(mut self, failures: u32) -> Self {
        self.device_loss_threshold = failures;
        self
    }

    /// Whether every aggregate can see at least one sample and the retry
    /// policy stays within [`MAX_ATTEMPTS`].
    pub fn is_valid(&self) -> bool {
        self.retry.attempts <= MAX_ATTEMPTS && self.aggregate_period > self.sample_period
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = NodeConfig::default();
        assert_eq!(Duration::from_secs(10), config.sample_period);
        assert_eq!(Duration::from_secs(60), config.aggregate_period);
        assert_eq!(RetryPolicy::default(), config.retry);
        assert_eq!(30, config.device_loss_threshold);
    }

    #[test]
    fn builder() {
        let config = NodeConfig::new()
            .with_sample_period(Duration::from_millis(250))
            .with_retry(RetryPolicy::once())
            .with_device_loss_threshold(0);
        assert_eq!(Duration::from_millis(250), config.sample_period);
        assert_eq!(Duration::from_secs(60), config.aggregate_period);
        assert_eq!(1, config.retry.attempts);
        assert_eq!(0, config.device_loss_threshold);
    }

    #[test]
    fn validity() {
        assert!(NodeConfig::new().is_valid());
        assert!(NodeConfig::new()
            .with_retry(RetryPolicy::new(MAX_ATTEMPTS, 1))
            .is_valid());
        assert!(!NodeConfig::new()
            .with_retry(RetryPolicy::new(MAX_ATTEMPTS + 1, 1))
            .is_valid());
        assert!(!NodeConfig::new()
            .with_aggregate_period(Duration::from_secs(10))
            .is_valid());
        assert!(!NodeConfig::new()
            .with_sample_period(Duration::from_secs(90))
            .is_valid());
    }
}
