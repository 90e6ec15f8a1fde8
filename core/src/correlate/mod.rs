pub mod buffer;
pub mod correlator;

pub use buffer::StationBuffers;
pub use correlator::take_match;
