use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::app::AppState;
use crate::database::models::UnknownVariant;
use crate::error::ApiError;
use crate::filter::{Filter, FilterSpec, Page};

/// Field deserializer that tells an absent key (`None`) from an explicit `null` (`Some(None)`).
/// Use together with `#[serde(default)]`.
pub fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Fail with every field that is absent or blank
pub fn require_fields(fields: &[(&'static str, Option<&str>)]) -> Result<(), ApiError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.map(str::trim).unwrap_or("").is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::missing_fields(missing))
    }
}

/// Parse an optional enum field, reporting bad values as `VALIDATION_ERROR`
pub fn parse_enum<T>(field: &str, value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = UnknownVariant>,
{
    match value {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ApiError::validation_error(format!("Invalid {}: '{}'", field, e.value))),
    }
}

/// Required string field, already checked by `require_fields`
pub fn text(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Filter and page for a list endpoint
pub fn list_params(state: &AppState, spec: &FilterSpec, params: &HashMap<String, String>) -> (Filter, Page) {
    let api = &state.config.api;
    (
        Filter::from_params(spec, params),
        Page::from_params(params, api.default_page_size, api.max_page_size),
    )
}

/// `limit` query parameter for the "latest N" dashboard views
pub fn latest_limit(params: &HashMap<String, String>, default: u32, max: u32) -> u32 {
    params
        .get("limit")
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|l| *l > 0)
        .unwrap_or(default)
        .min(max.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::CaseStatus;

    #[test]
    fn require_fields_lists_every_missing_field() {
        let err = require_fields(&[("type", None), ("location", Some("  ")), ("title", Some("x"))]).unwrap_err();
        match err {
            ApiError::MissingFields(fields) => assert_eq!(fields, vec!["type", "location"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn parse_enum_rejects_unknown_values() {
        assert_eq!(parse_enum::<CaseStatus>("status", Some("resolved")).unwrap(), Some(CaseStatus::Resolved));
        assert_eq!(parse_enum::<CaseStatus>("status", None).unwrap(), None);

        let err = parse_enum::<CaseStatus>("status", Some("archived")).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn latest_limit_defaults_and_caps() {
        let params: HashMap<String, String> = [("limit".to_string(), "500".to_string())].into();
        assert_eq!(latest_limit(&params, 10, 100), 100);
        assert_eq!(latest_limit(&HashMap::new(), 10, 100), 10);
    }
}
