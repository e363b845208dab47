use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{ReqlogError, Result};
use crate::time::parse_query_time;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Case-sensitive substring test against a raw line. An empty needle
/// matches every line.
pub fn text_matches(needle: &str, line: &str) -> bool {
    needle.is_empty() || line.contains(needle)
}

/// Inclusive time bounds. An absent bound is open.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    pub since: Option<DateTime<FixedOffset>>,
    pub until: Option<DateTime<FixedOffset>>,
}

impl TimeWindow {
    /// Builds a window from raw `start_time`/`end_time` query values. Empty
    /// values leave the bound open.
    pub fn parse(start_time: Option<&str>, end_time: Option<&str>) -> Result<Self> {
        let since = parse_bound(start_time, "start_time")?;
        let until = parse_bound(end_time, "end_time")?;
        Ok(Self { since, until })
    }

    pub fn is_unbounded(&self) -> bool {
        self.since.is_none() && self.until.is_none()
    }

    pub fn contains(&self, ts: DateTime<FixedOffset>) -> bool {
        if let Some(since) = self.since
            && ts < since
        {
            return false;
        }
        if let Some(until) = self.until
            && ts > until
        {
            return false;
        }
        true
    }
}

fn parse_bound(raw: Option<&str>, name: &str) -> Result<Option<DateTime<FixedOffset>>> {
    match raw {
        None | Some("") => Ok(None),
        Some(value) => parse_query_time(value).map(Some).map_err(|_| {
            ReqlogError::Parse(format!("Invalid {name} format. Use RFC3339 format"))
        }),
    }
}

/// A 1-based page of `page_size` matches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageWindow {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageWindow {
    /// Non-numeric or non-positive values fall back to the defaults.
    pub fn parse(page: Option<&str>, page_size: Option<&str>) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            page_size: parse_positive(page_size).unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    fn upper(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }

    fn lower(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Whether the match with 1-based `ordinal` lands on this page.
    pub fn contains(&self, ordinal: usize) -> bool {
        ordinal > self.lower() && ordinal <= self.upper()
    }

    pub fn has_more(&self, total: usize) -> bool {
        total > self.upper()
    }
}

fn parse_positive(raw: Option<&str>) -> Option<usize> {
    let value = raw?.trim().parse::<i64>().ok()?;
    if value < 1 {
        return None;
    }
    usize::try_from(value).ok()
}
