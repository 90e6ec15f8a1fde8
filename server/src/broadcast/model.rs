use serde::{Deserialize, Serialize};
use stormcore::records::StrikeRecord;

/// Recent fused strikes exposed to HTTP clients, newest last.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BroadcastModel {
    pub strikes: Vec<StrikeRecord>,
    pub status: String,
}
