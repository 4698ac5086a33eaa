//! Bounded buffer of compensated readings shared between the sampler and
//! the aggregator.

use crate::domain::reading::Reading;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use heapless::Vec;

pub const DEFAULT_WINDOW_CAPACITY: usize = 16;

/// Per-field arithmetic means of one drained window.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindowMeans {
    pub temperature: f32,
    pub pressure: f32,
    pub humidity: f32,
    pub samples: usize,
}

impl WindowMeans {
    /// `None` for an empty slice.
    pub fn of(readings: &[Reading]) -> Option<Self> {
        if readings.is_empty() {
            return None;
        }
        let (temperature, pressure, humidity) = readings.iter().fold(
            (0.0f32, 0.0f32, 0.0f32),
            |(t, p, h), r| (t + r.temperature, p + r.pressure, h + r.humidity),
        );
        let n = readings.len() as f32;
        Some(Self {
            temperature: temperature / n,
            pressure: pressure / n,
            humidity: humidity / n,
            samples: readings.len(),
        })
    }
}

/// Holds at most `N` readings. When full, new readings are dropped and the
/// ones already buffered are kept.
pub struct SampleWindow<M, const N: usize>
where
    M: RawMutex,
{
    readings: Mutex<M, Vec<Reading, N>>,
}

impl<M, const N: usize> SampleWindow<M, N>
where
    M: RawMutex,
{
    pub const fn new() -> Self {
        Self {
            readings: Mutex::new(Vec::new()),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Appends a reading; returns `false` if the window was full and the
    /// reading was dropped.
    pub async fn append(&self, reading: Reading) -> bool {
        let mut readings = self.readings.lock().await;
        readings.push(reading).is_ok()
    }

    /// Computes the means over everything buffered and empties the window.
    ///
    /// Both happen under one lock, so no reading appended concurrently is
    /// lost or counted twice.
    pub async fn drain_means(&self) -> Option<WindowMeans> {
        let mut readings = self.readings.lock().await;
        let means = WindowMeans::of(&readings)?;
        readings.clear();
        Some(means)
    }

    pub async fn len(&self) -> usize {
        self.readings.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Copy of the buffered readings, oldest first.
    pub async fn snapshot(&self) -> Vec<Reading, N> {
        self.readings.lock().await.clone()
    }
}

impl<M, const N: usize> Default for SampleWindow<M, N>
where
    M: RawMutex,
{
    fn default() -> Self {
        Self::new()
    }
}
