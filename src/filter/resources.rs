use super::types::{Comparison, FilterField, FilterSpec};

const fn eq_ci(param: &'static str, column: &'static str) -> FilterField {
    FilterField { param, column, comparison: Comparison::EqualsIgnoreCase }
}

pub const CASE_FILTERS: FilterSpec = FilterSpec {
    fields: &[
        eq_ci("status", "status"),
        eq_ci("type", "case_type"),
        eq_ci("priority", "priority"),
        // uuid text is lowercase; accept the id in any case
        eq_ci("officer", "assigned_to"),
    ],
    search_columns: &["case_id", "title", "description", "location"],
};

pub const OFFICER_FILTERS: FilterSpec = FilterSpec {
    fields: &[eq_ci("status", "status"), eq_ci("rank", "rank"), eq_ci("unit", "unit")],
    search_columns: &["badge_number", "name", "unit"],
};

pub const REPORT_FILTERS: FilterSpec = FilterSpec {
    fields: &[eq_ci("type", "report_type"), eq_ci("case", "case_id")],
    search_columns: &["report_id", "title", "content"],
};

pub const INCIDENT_FILTERS: FilterSpec = FilterSpec {
    fields: &[
        eq_ci("status", "status"),
        eq_ci("type", "incident_type"),
        eq_ci("severity", "severity"),
        eq_ci("case", "case_id"),
    ],
    search_columns: &["title", "description", "location"],
};

pub const USER_FILTERS: FilterSpec = FilterSpec {
    fields: &[eq_ci("role", "role"), eq_ci("status", "status"), eq_ci("department", "department")],
    search_columns: &["username", "name", "email"],
};
