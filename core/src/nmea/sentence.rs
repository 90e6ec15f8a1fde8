use crate::prelude::{EngineError, EngineResult};

pub const MILES_TO_KM: f64 = 1.60934;

const SENTENCE_TAG: &str = "$WIMLI";
const SENTENCE_PREFIX: &str = "$WIMLI,";
const MIN_FIELDS: usize = 4;

/// Distance/bearing pair decoded from one lightning sentence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WimliReading {
    pub distance_km: f64,
    pub bearing_deg: f64,
}

/// Extracts every `$WIMLI,...*XX` sentence embedded in a payload. A single
/// transport payload may carry several concatenated sentences mixed with
/// noise lines; anything without a two-character checksum suffix is
/// ignored.
pub fn scan_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    for (start, _) in text.match_indices(SENTENCE_PREFIX) {
        let tail = &text[start..];
        let Some(star) = tail.find('*') else {
            continue;
        };
        let checksum = &tail.as_bytes()[star + 1..];
        if checksum.len() >= 2 && checksum[..2].iter().all(u8::is_ascii_alphanumeric) {
            sentences.push(&tail[..star + 3]);
        }
    }
    sentences
}

/// Decodes a `$WIMLI` sentence: distance in statute miles at field 1
/// (converted to kilometers), bearing in degrees at field 3 with the
/// `*checksum` suffix stripped.
pub fn parse_wimli(sentence: &str) -> EngineResult<WimliReading> {
    let fields: Vec<&str> = sentence.split(',').collect();
    if fields.len() < MIN_FIELDS {
        return Err(EngineError::Parse(format!(
            "expected at least {} fields: {}",
            MIN_FIELDS, sentence
        )));
    }
    if fields[0] != SENTENCE_TAG {
        return Err(EngineError::Parse(format!(
            "unrecognized sentence tag: {}",
            fields[0]
        )));
    }

    let distance_miles: f64 = fields[1]
        .parse()
        .map_err(|_| EngineError::Parse(format!("bad distance field: {}", fields[1])))?;
    let bearing_text = fields[3].split('*').next().unwrap_or("");
    let bearing_deg: f64 = bearing_text
        .parse()
        .map_err(|_| EngineError::Parse(format!("bad bearing field: {}", fields[3])))?;

    Ok(WimliReading {
        distance_km: distance_miles * MILES_TO_KM,
        bearing_deg,
    })
}
