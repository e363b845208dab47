use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Duration, TimeZone, Utc};
use reqlog_core::model::LogRecord;
use reqlog_core::model::codec::encode_line;
use reqlog_core::time::format_timestamp;

pub fn sample_record(request_number: u64, time: &str, url: &str) -> LogRecord {
    LogRecord {
        body: Some(serde_json::Value::String("e30=".to_string())),
        headers: BTreeMap::from([
            ("Content-Type".to_string(), vec!["application/json".to_string()]),
            ("User-Agent".to_string(), vec!["testkit/1.0".to_string()]),
        ]),
        is_body_base64: true,
        method: "POST".to_string(),
        request_number,
        time: time.to_string(),
        url: url.to_string(),
    }
}

/// A sample record encoded exactly as the capture writer would, newline
/// included.
pub fn record_line(request_number: u64, time: &str, url: &str) -> String {
    let line = encode_line(&sample_record(request_number, time, url))
        .expect("sample record encodes");
    String::from_utf8(line).expect("encoded line is utf-8")
}

/// `count` records one minute apart starting 2026-02-01T00:00:00Z, with urls
/// `/events/<n>`.
pub fn minute_series(count: u64) -> String {
    let base = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
    (1..=count)
        .map(|n| {
            let ts = base + Duration::minutes(n as i64 - 1);
            record_line(n, &format_timestamp(&ts), &format!("/events/{n}"))
        })
        .collect()
}

pub fn write_log(dir: &Path, id: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.join(format!("{id}.log"));
    fs::write(&path, contents)?;
    Ok(path)
}

