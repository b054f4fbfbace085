use serde::Serialize;

/// How a recognized query parameter is compared against its column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Exact text equality
    Equals,
    /// Text equality ignoring ASCII case
    EqualsIgnoreCase,
}

/// A query parameter a resource accepts, and the column it filters
#[derive(Debug, Clone, Copy)]
pub struct FilterField {
    pub param: &'static str,
    pub column: &'static str,
    pub comparison: Comparison,
}

/// Per-resource filter configuration: recognized keys plus the columns `search` scans
#[derive(Debug, Clone, Copy)]
pub struct FilterSpec {
    pub fields: &'static [FilterField],
    pub search_columns: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    pub column: &'static str,
    pub comparison: Comparison,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<String>,
}

/// Page request derived from `page` and `limit` query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub fn offset(&self) -> u32 {
        (self.page.saturating_sub(1)).saturating_mul(self.limit)
    }
}

/// One page of rows together with the unpaginated total
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: Page, total: i64) -> Self {
        let limit = i64::from(page.limit.max(1));
        Self {
            page: page.page,
            limit: page.limit,
            total,
            pages: (total + limit - 1) / limit,
        }
    }
}

/// Column access used to evaluate filters against in-memory records
pub trait FilterRecord {
    fn column(&self, name: &str) -> Option<String>;
}
