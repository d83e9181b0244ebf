pub mod collector;
pub mod platform;
pub mod rate;
pub mod registry;
pub mod series;
pub mod source;

pub use collector::{SampleCollector, TickSummary};
pub use rate::{RateCalculator, RatePoint, ResetPolicy};
pub use registry::{Channel, EntityClass, EntityRegistry};
pub use series::SeriesBuffer;
