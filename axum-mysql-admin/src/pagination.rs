//! Page window arithmetic for the content browser

use crate::config::AdminConfig;
use serde::{Deserialize, Serialize};

/// A validated page window: both values are at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    limit: u64,
}

impl Pagination {
    /// Build a window, replacing zero values with the defaults
    pub fn new(page: u64, limit: u64, config: &AdminConfig) -> Self {
        let page = if page == 0 { 1 } else { page };
        let limit = if limit == 0 {
            config.default_page_size
        } else {
            limit
        };

        Self {
            page,
            limit: limit.min(config.max_page_size),
        }
    }

    /// Parse raw query-string values
    ///
    /// Absent, non-numeric or non-positive input falls back to page 1 and the
    /// configured default page size.
    pub fn from_params(page: Option<&str>, limit: Option<&str>, config: &AdminConfig) -> Self {
        Self::new(
            page.and_then(parse_positive).unwrap_or(1),
            limit
                .and_then(parse_positive)
                .unwrap_or(config.default_page_size),
            config,
        )
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Rows skipped before this page: `(page - 1) * limit`
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `ceil(total / limit)`
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

/// Leading-digits integer parse, so `"3"` and `"3rd"` both yield 3
fn parse_positive(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());

    trimmed[..digits_end]
        .parse::<u64>()
        .ok()
        .filter(|value| *value > 0)
}

/// Sort order for browsed rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Only a case-insensitive `desc` sorts descending
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.trim().eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// An ORDER BY request whose column has already been checked against the schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}
