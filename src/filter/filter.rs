use std::collections::HashMap;

use super::types::{Comparison, FilterCondition, FilterRecord, FilterSpec, Page, SqlResult};

/// Validated set of conditions built from recognized query parameters
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<FilterCondition>,
    search: Option<Search>,
}

#[derive(Debug, Clone)]
struct Search {
    columns: &'static [&'static str],
    term: String,
}

impl Filter {
    /// Keep only the keys `spec` recognizes; blank values are ignored
    pub fn from_params(spec: &FilterSpec, params: &HashMap<String, String>) -> Self {
        let conditions = spec
            .fields
            .iter()
            .filter_map(|field| {
                let value = params.get(field.param)?.trim();
                if value.is_empty() || value.eq_ignore_ascii_case("all") {
                    return None;
                }
                Some(FilterCondition {
                    column: field.column,
                    comparison: field.comparison,
                    value: value.to_string(),
                })
            })
            .collect();

        let search = params
            .get("search")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty() && !spec.search_columns.is_empty())
            .map(|term| Search { columns: spec.search_columns, term: term.to_string() });

        Self { conditions, search }
    }

    /// Single exact-match condition, used by the statistics counters
    pub fn eq(column: &'static str, value: impl ToString) -> Self {
        Self {
            conditions: vec![FilterCondition {
                column,
                comparison: Comparison::Equals,
                value: value.to_string(),
            }],
            search: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.search.is_none()
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    /// Render a `WHERE` clause with positional parameters starting at `$start_index`.
    /// Column names only ever come from static filter configuration.
    pub fn to_where_sql(&self, start_index: usize) -> SqlResult {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        let mut index = start_index;

        for condition in &self.conditions {
            let clause = match condition.comparison {
                Comparison::Equals => format!("CAST(\"{}\" AS TEXT) = ${}", condition.column, index),
                Comparison::EqualsIgnoreCase => {
                    format!("LOWER(CAST(\"{}\" AS TEXT)) = LOWER(${})", condition.column, index)
                }
            };
            clauses.push(clause);
            params.push(condition.value.clone());
            index += 1;
        }

        if let Some(search) = &self.search {
            let ors: Vec<String> = search
                .columns
                .iter()
                .map(|column| format!("COALESCE(CAST(\"{}\" AS TEXT), '') ILIKE ${}", column, index))
                .collect();
            clauses.push(format!("({})", ors.join(" OR ")));
            params.push(format!("%{}%", escape_like(&search.term)));
        }

        let query = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        SqlResult { query, params }
    }

    /// Evaluate the same semantics as `to_where_sql` against an in-memory record
    pub fn matches<R: FilterRecord>(&self, record: &R) -> bool {
        let conditions_hold = self.conditions.iter().all(|condition| {
            let Some(actual) = record.column(condition.column) else {
                return false;
            };
            match condition.comparison {
                Comparison::Equals => actual == condition.value,
                Comparison::EqualsIgnoreCase => actual.to_lowercase() == condition.value.to_lowercase(),
            }
        });

        if !conditions_hold {
            return false;
        }

        match &self.search {
            None => true,
            Some(search) => {
                let needle = search.term.to_lowercase();
                search.columns.iter().any(|column| {
                    record
                        .column(column)
                        .map(|value| value.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                })
            }
        }
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl Page {
    /// Parse `page`/`limit`; invalid or zero values fall back to defaults, `limit` is capped
    pub fn from_params(params: &HashMap<String, String>, default_limit: u32, max_limit: u32) -> Self {
        let page = params
            .get("page")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);
        let limit = params
            .get("limit")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(default_limit)
            .min(max_limit.max(1));

        Self { page, limit }
    }

    /// Convenience for "latest N" queries
    pub fn first(limit: u32) -> Self {
        Self { page: 1, limit }
    }
}
