use chrono::{DateTime, Utc};

use crate::prelude::{EngineError, EngineResult};

/// Splits a transport payload into its ISO-8601 header timestamp and the
/// sentence body that follows on the remaining lines.
pub fn split_payload(text: &str) -> EngineResult<(DateTime<Utc>, &str)> {
    let mut lines = text.splitn(2, '\n');
    let header = lines.next().unwrap_or("").trim();
    let body = lines.next().unwrap_or("");

    let received_at = DateTime::parse_from_rfc3339(header)
        .map_err(|err| EngineError::Parse(format!("invalid payload timestamp {:?}: {}", header, err)))?
        .with_timezone(&Utc);

    Ok((received_at, body))
}
