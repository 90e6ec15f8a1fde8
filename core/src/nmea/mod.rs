pub mod payload;
pub mod sentence;

pub use payload::split_payload;
pub use sentence::{parse_wimli, scan_sentences, WimliReading};
