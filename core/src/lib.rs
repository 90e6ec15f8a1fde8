//! Event-correlation and fusion core for the multi-station storm locator.
//!
//! The modules take each ground station's bearing+distance reports through
//! sentence parsing, great-circle projection, cross-station correlation,
//! and TDOA multilateration, handing finished events to a pluggable sink.

pub mod correlate;
pub mod engine;
pub mod fusion;
pub mod geo;
pub mod nmea;
pub mod prelude;
pub mod records;
pub mod telemetry;

pub use engine::{CorrelationEngine, EngineHandle};
pub use prelude::{EngineConfig, EngineError, EngineResult, EventSink};
