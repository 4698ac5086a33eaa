pub mod rain;
pub mod reading;
pub mod record;

pub use rain::{DecisionTree, RuleTable};
pub use reading::{RawSample, Reading};
pub use record::AggregateRecord;
