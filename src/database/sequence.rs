//! Human-readable sequential codes (`CA-0001`, `RPT-0001`).
//!
//! The numeric part comes from `Store::next_sequence`, an atomic per-kind
//! counter seeded from the highest suffix already stored, so two concurrent
//! creations never receive the same code.

use serde::{Deserialize, Serialize};

use super::manager::DatabaseError;
use super::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequenceKind {
    Case,
    Report,
}

impl SequenceKind {
    pub fn name(&self) -> &'static str {
        match self {
            SequenceKind::Case => "case",
            SequenceKind::Report => "report",
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            SequenceKind::Case => "CA-",
            SequenceKind::Report => "RPT-",
        }
    }

    pub fn width(&self) -> usize {
        4
    }

    /// Table and code column holding the issued codes
    pub fn source(&self) -> (&'static str, &'static str) {
        match self {
            SequenceKind::Case => ("cases", "case_id"),
            SequenceKind::Report => ("reports", "report_id"),
        }
    }

    pub fn code(&self, n: i64) -> String {
        format_code(self.prefix(), n, self.width())
    }

    pub fn seed(&self) -> String {
        self.code(1)
    }
}

/// Numeric suffix of `code` when it carries `prefix` followed by digits only
pub fn parse_suffix(code: &str, prefix: &str) -> Option<i64> {
    let digits = code.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Zero-pads to `width`; wider numbers are printed in full
pub fn format_code(prefix: &str, n: i64, width: usize) -> String {
    format!("{}{:0width$}", prefix, n, width = width)
}

/// Code following `last`, or the seed when nothing was issued yet
pub fn next_code(kind: SequenceKind, last: Option<&str>) -> String {
    match last.and_then(|code| parse_suffix(code, kind.prefix())) {
        Some(n) => kind.code(n + 1),
        None => kind.seed(),
    }
}

/// Highest suffix among `codes`, zero when none parse
pub fn max_suffix<'a>(kind: SequenceKind, codes: impl IntoIterator<Item = &'a str>) -> i64 {
    codes
        .into_iter()
        .filter_map(|code| parse_suffix(code, kind.prefix()))
        .max()
        .unwrap_or(0)
}

pub async fn allocate(store: &dyn Store, kind: SequenceKind) -> Result<String, DatabaseError> {
    let n = store.next_sequence(kind).await?;
    Ok(kind.code(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_case_gets_seed() {
        assert_eq!(next_code(SequenceKind::Case, None), "CA-0001");
        assert_eq!(next_code(SequenceKind::Report, None), "RPT-0001");
    }

    #[test]
    fn increments_last_code() {
        assert_eq!(next_code(SequenceKind::Case, Some("CA-0042")), "CA-0043");
        assert_eq!(next_code(SequenceKind::Report, Some("RPT-0099")), "RPT-0100");
    }

    #[test]
    fn overflowing_width_keeps_all_digits() {
        assert_eq!(next_code(SequenceKind::Case, Some("CA-9999")), "CA-10000");
    }

    #[test]
    fn foreign_or_malformed_codes_fall_back_to_seed() {
        assert_eq!(next_code(SequenceKind::Case, Some("RPT-0005")), "CA-0001");
        assert_eq!(next_code(SequenceKind::Case, Some("CA-12a")), "CA-0001");
        assert_eq!(parse_suffix("CA-", "CA-"), None);
    }

    #[test]
    fn max_suffix_ignores_unparseable() {
        let codes = ["CA-0003", "CA-0010", "bogus", "RPT-0500"];
        assert_eq!(max_suffix(SequenceKind::Case, codes), 10);
        assert_eq!(max_suffix(SequenceKind::Report, Vec::<&str>::new()), 0);
    }
}
