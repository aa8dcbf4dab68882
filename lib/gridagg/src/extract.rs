use serde::Deserialize;
use serde_json::Value;

/// Outcome of pulling one raw line apart. `Unusable` is an ordinary value,
/// not an error: record-level damage must never abort a scan.
#[derive(Debug)]
pub enum Extracted {
    Post(Post),
    Unusable(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Line failed to parse as JSON under both terminator strips.
    Parse,
    /// Parsed, but nothing at the expected coordinate path.
    MissingCoordinate,
    /// Coordinate present but not a usable numeric pair.
    CoordinateShape,
}

/// One usable post, pulled out of a raw line and discarded as soon as it
/// has been folded into an accumulator. Hashtag text is passed through
/// verbatim; case folding happens at aggregation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub coordinate: Option<(f64, f64)>,
    pub hashtags: Vec<String>,
}

// Serde view of one export row. Only the paths the aggregation needs are
// declared; everything else in the record is skipped by serde.
#[derive(Deserialize)]
struct RawRecord {
    doc: Option<RawDoc>,
}

#[derive(Deserialize)]
struct RawDoc {
    coordinates: Option<Value>,
    #[serde(default)]
    entities: RawEntities,
}

#[derive(Deserialize, Default)]
struct RawEntities {
    #[serde(default)]
    hashtags: Vec<RawHashtag>,
}

#[derive(Deserialize)]
struct RawHashtag {
    text: String,
}

/// Extract a structured post from one raw line of the export file.
///
/// Interior record lines end in the two-byte `,\n` (record separator plus
/// newline); the last record before the footer ends in the bare `\n`. The
/// two-byte strip is tried first, the one-byte strip only if that fails to
/// parse. A line unusable under both strips is skipped, never fatal.
pub fn extract(raw_line: &[u8]) -> Extracted {
    let record = match parse_stripped(raw_line, 2).or_else(|| parse_stripped(raw_line, 1)) {
        Some(r) => r,
        None => return Extracted::Unusable(SkipReason::Parse),
    };

    let doc = match record.doc {
        Some(doc) => doc,
        None => return Extracted::Unusable(SkipReason::MissingCoordinate),
    };
    let point = match doc.coordinates {
        Some(p) => p,
        None => return Extracted::Unusable(SkipReason::MissingCoordinate),
    };
    let coordinate = match coordinate_pair(&point) {
        Ok(xy) => xy,
        Err(reason) => return Extracted::Unusable(reason),
    };

    let hashtags = doc.entities.hashtags.into_iter().map(|h| h.text).collect();
    Extracted::Post(Post { coordinate: Some(coordinate), hashtags })
}

fn parse_stripped(raw: &[u8], strip: usize) -> Option<RawRecord> {
    let end = raw.len().checked_sub(strip)?;
    serde_json::from_slice(&raw[..end]).ok()
}

// The geometry value holds the pair at its own "coordinates" key. The
// original records occasionally carry extra trailing elements; the first
// two are the pair.
fn coordinate_pair(point: &Value) -> Result<(f64, f64), SkipReason> {
    let arr = match point.get("coordinates").and_then(Value::as_array) {
        Some(arr) => arr,
        None => return Err(SkipReason::CoordinateShape),
    };
    if arr.len() < 2 {
        return Err(SkipReason::CoordinateShape);
    }
    match (arr[0].as_f64(), arr[1].as_f64()) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(SkipReason::CoordinateShape),
    }
}
