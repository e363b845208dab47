use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::model::record::LogRecord;
use crate::time::parse_timestamp;

/// One line of a log file as seen by the reader.
///
/// Lines that do not decode as a [`LogRecord`] (separate body lines,
/// truncated writes, foreign text) are kept verbatim as `Raw`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LogEntry {
    Raw { raw_entry: String },
    Record(LogRecord),
}

impl LogEntry {
    pub fn from_line(line: &str) -> Self {
        // serde also accepts a JSON array for a struct; only objects count.
        if line.trim_start().starts_with('{')
            && let Ok(record) = serde_json::from_str::<LogRecord>(line)
        {
            return Self::Record(record);
        }
        Self::Raw {
            raw_entry: line.to_string(),
        }
    }

    pub fn record(&self) -> Option<&LogRecord> {
        match self {
            Self::Record(record) => Some(record),
            Self::Raw { .. } => None,
        }
    }

    /// Capture time of a record whose `time` field is present and valid.
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        let record = self.record()?;
        if record.time.is_empty() {
            return None;
        }
        parse_timestamp(&record.time).ok()
    }
}
