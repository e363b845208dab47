use std::borrow::Cow;
use std::io::{BufRead, BufReader};

use reqlog_core::error::{ReqlogError, Result};
use reqlog_core::filter::text_matches;
use reqlog_core::model::LogEntry;
use reqlog_core::query::{SearchPage, SearchParams, SearchRequest};

use crate::dir::LogDir;

impl LogDir {
    /// Resolves the file, validates the time bounds and scans. Errors come
    /// out in that order: missing id, unknown file, bad time, read failure.
    pub fn search(&self, params: &SearchParams) -> Result<SearchPage> {
        let id = params.file_id()?;
        let file = self.open(&id)?;
        let req = params.request()?;
        scan(BufReader::new(file), &req)
    }
}

/// One forward pass over `reader`. Every line passing the text filter and
/// not excluded by time counts toward the total; the page keeps the ones
/// whose running count falls inside it.
pub fn scan<R: BufRead>(mut reader: R, req: &SearchRequest) -> Result<SearchPage> {
    let mut buf = Vec::new();
    let mut entries = Vec::new();
    let mut total_count = 0usize;

    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).map_err(|e| {
            tracing::warn!(error = %e, "log scan failed");
            ReqlogError::Io("Error reading log file".to_string())
        })?;
        if read == 0 {
            break;
        }

        let line = decode_line(&buf);
        if !text_matches(&req.needle, &line) {
            continue;
        }

        if req.window.is_unbounded() {
            total_count += 1;
            if req.page.contains(total_count) {
                entries.push(LogEntry::from_line(&line));
            }
            continue;
        }

        let entry = LogEntry::from_line(&line);
        if let Some(ts) = entry.timestamp()
            && !req.window.contains(ts)
        {
            continue;
        }
        total_count += 1;
        if req.page.contains(total_count) {
            entries.push(entry);
        }
    }

    Ok(SearchPage {
        entries,
        total_count,
        page: req.page.page,
        page_size: req.page.page_size,
        has_more: req.page.has_more(total_count),
    })
}

fn decode_line(buf: &[u8]) -> Cow<'_, str> {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line)
}
