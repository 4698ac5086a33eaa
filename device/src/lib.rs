#![macro_use]
#![cfg_attr(not(feature = "std"), no_std)]
//! Rain Node samples a Bosch BME280 over I2C, averages the readings over a
//! fixed window, estimates how likely rain is and sends one JSON line per
//! window over a serial link. It is async and allocation free, built on
//! [embassy](https://github.com/embassy-rs/embassy).
//!
//! # Units
//!
//! A node consists of two long-running units sharing a bounded
//! [`SampleWindow`]:
//!
//! * the [`Sampler`](actors::Sampler) reads and compensates one sample per
//!   sample period and appends it to the window,
//! * the [`Aggregator`](actors::Aggregator) drains the window once per
//!   aggregate period, classifies the means and transmits a record.
//!
//! Neither unit does anything before sensor bring-up succeeded and the
//! [`StartGate`] was opened. If bring-up fails the gate stays closed and the
//! node reports why.
//!
//! # Example
//!
//! ```ignore
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use rain_node::{domain::RuleTable, *};
//!
//! static WINDOW: SampleWindow<CriticalSectionRawMutex, DEFAULT_WINDOW_CAPACITY> = SampleWindow::new();
//! static GATE: StartGate<CriticalSectionRawMutex> = StartGate::new();
//!
//! let node = Node::new(i2c, delay, uart, RuleTable::new(), &WINDOW, &GATE, NodeConfig::default());
//! let reason = node.run().await;
//! ```

#[macro_use]
pub(crate) mod fmt;

pub mod traits;

pub mod drivers;

pub mod domain;

pub mod window;
pub use window::{SampleWindow, WindowMeans, DEFAULT_WINDOW_CAPACITY};

pub mod gate;
pub use gate::StartGate;

pub mod actors;

pub mod config;
pub use config::NodeConfig;

pub mod node;
pub use node::{Node, NodeError};

#[cfg(feature = "std")]
pub mod testutil;

pub use rain_node_macros::config;
