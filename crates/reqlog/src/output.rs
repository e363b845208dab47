use reqlog_core::model::LogEntry;
use reqlog_core::query::{LogFileItem, SearchPage};

const RAW_PREVIEW_CHARS: usize = 120;

pub fn print_files_human(files: &[LogFileItem]) {
    for file in files {
        println!("{}", file.name);
    }
    println!("-- {} files --", files.len());
}

pub fn print_search_human(v: &SearchPage) {
    for entry in &v.entries {
        println!("{}", entry_line(entry));
    }
    println!(
        "-- {} matches (page {}, {} shown{}) --",
        v.total_count,
        v.page,
        v.entries.len(),
        if v.has_more { ", more" } else { "" }
    );
}

fn entry_line(entry: &LogEntry) -> String {
    match entry {
        LogEntry::Record(r) => {
            let body = match r.decoded_body() {
                Some(bytes) => format!("body={}B", bytes.len()),
                None => "body=-".to_string(),
            };
            let time = if r.time.is_empty() { "-" } else { &r.time };
            format!(
                "#{} {} {} {} headers={} {}",
                r.request_number,
                time,
                r.method,
                r.url,
                r.headers.len(),
                body
            )
        }
        LogEntry::Raw { raw_entry } => format!("  | {}", preview(raw_entry)),
    }
}

fn preview(raw: &str) -> String {
    if raw.chars().count() <= RAW_PREVIEW_CHARS {
        return raw.to_string();
    }
    let cut: String = raw.chars().take(RAW_PREVIEW_CHARS).collect();
    format!("{cut}…")
}
