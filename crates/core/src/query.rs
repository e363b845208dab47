use serde::{Deserialize, Serialize};

use crate::error::{ReqlogError, Result};
use crate::filter::{PageWindow, TimeWindow};
use crate::model::LogEntry;

/// Raw search parameters as they arrive on the query string. Everything is
/// kept as text so that lenient defaults apply to `page`/`page_size`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub file: Option<String>,
    pub q: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl SearchParams {
    /// The log id to open, with spaces turned back into `+`.
    pub fn file_id(&self) -> Result<String> {
        match self.file.as_deref() {
            None | Some("") => Err(ReqlogError::InvalidArgument(
                "File name is required".to_string(),
            )),
            Some(file) => Ok(file.replace(' ', "+")),
        }
    }

    pub fn request(&self) -> Result<SearchRequest> {
        Ok(SearchRequest {
            needle: self.q.clone().unwrap_or_default(),
            window: TimeWindow::parse(self.start_time.as_deref(), self.end_time.as_deref())?,
            page: PageWindow::parse(self.page.as_deref(), self.page_size.as_deref()),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchRequest {
    pub needle: String,
    pub window: TimeWindow,
    pub page: PageWindow,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchPage {
    pub entries: Vec<LogEntry>,
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogFileItem {
    pub name: String,
}
