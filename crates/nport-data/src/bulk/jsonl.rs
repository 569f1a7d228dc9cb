//! Gzip-compressed JSON-lines decoding.
//!
//! Objects are decoded as a stream: each line is parsed and handed to a
//! visitor, then dropped, so only what the visitor keeps stays in memory.

use crate::error::Result;
use flate2::read::MultiGzDecoder;
use serde_json::Value;
use std::io::{BufRead, BufReader};

/// Line counts for one JSON-lines stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    /// Lines that parsed and were visited
    pub records: usize,
    /// Non-blank lines that failed to parse
    pub malformed: usize,
}

/// Gunzip `bytes` (every gzip member) and visit each line as a JSON record.
///
/// # Errors
/// Returns `DataError::Io` if the payload is not valid gzip. Records visited
/// before the failure have already been passed to `visit`. Individual
/// malformed lines are counted, never fatal.
pub fn decode_jsonl_gz<F>(bytes: &[u8], visit: F) -> Result<LineStats>
where
    F: FnMut(Value),
{
    visit_json_lines(BufReader::new(MultiGzDecoder::new(bytes)), visit)
}

/// Visit newline-delimited JSON, skipping blank and malformed lines.
///
/// # Errors
/// Returns `DataError::Io` if reading from `reader` fails.
pub fn visit_json_lines<R, F>(reader: R, mut visit: F) -> Result<LineStats>
where
    R: BufRead,
    F: FnMut(Value),
{
    let mut stats = LineStats::default();

    for line in reader.split(b'\n') {
        let line = line?;
        let line = line.trim_ascii();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_slice::<Value>(line) {
            Ok(record) => {
                stats.records += 1;
                visit(record);
            }
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed JSON line");
                stats.malformed += 1;
            }
        }
    }

    Ok(stats)
}
