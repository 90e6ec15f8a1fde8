pub mod report;
pub mod strike;

pub use report::{RawReport, StationConfig};
pub use strike::{FusedEvent, MatchedEvent, StrikeRecord};
