//! The two long-running units of the node. Both park at the start gate and
//! only touch the sensor or the link once it has opened.

pub mod aggregator;
pub mod sampler;

pub use aggregator::Aggregator;
pub use sampler::{SampleOutcome, Sampler, SamplerState};
