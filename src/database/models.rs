use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use crate::filter::FilterRecord;

#[derive(Debug, Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a lowercase text-backed enum stored as TEXT and serialized as its string form.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant { kind: $kind, value: other.to_string() }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = UnknownVariant;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

text_enum!(Role, "role", { Admin => "admin", Officer => "officer" });
text_enum!(AccountStatus, "account status", { Active => "active", Inactive => "inactive" });
text_enum!(CaseStatus, "case status", {
    Open => "open",
    Investigation => "investigation",
    Resolved => "resolved",
});
text_enum!(Priority, "priority", { Low => "low", Medium => "medium", High => "high" });
text_enum!(OfficerStatus, "officer status", {
    Active => "active",
    OnLeave => "on_leave",
    Inactive => "inactive",
});
text_enum!(IncidentStatus, "incident status", {
    Reported => "reported",
    Investigating => "investigating",
    Closed => "closed",
});

/// Login identity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    pub department: Option<String>,
    pub badge_number: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    #[sqlx(try_from = "String")]
    pub status: AccountStatus,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Apply `changes` in place; fields left as `None` keep their stored value
    pub fn apply(&mut self, changes: &AccountChanges, at: DateTime<Utc>) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(email) = &changes.email {
            self.email = email.clone();
        }
        if let Some(department) = &changes.department {
            self.department = department.clone();
        }
        if let Some(badge_number) = &changes.badge_number {
            self.badge_number = badge_number.clone();
        }
        if let Some(role) = changes.role {
            self.role = role;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(password_hash) = &changes.password_hash {
            self.password_hash = password_hash.clone();
        }
        self.updated_at = at;
    }
}

/// Column-level account edit. Only the `Some` fields are written, so concurrent
/// edits of different columns never overwrite each other.
/// `department` and `badge_number` use `Some(None)` to clear the column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<Option<String>>,
    pub badge_number: Option<Option<String>>,
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Case {
    pub case_id: String,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub case_type: String,
    pub description: Option<String>,
    pub location: String,
    #[sqlx(try_from = "String")]
    pub status: CaseStatus,
    #[sqlx(try_from = "String")]
    pub priority: Priority,
    pub created_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Report {
    pub report_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub report_type: String,
    pub content: String,
    pub case_id: Option<String>,
    pub generated_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Personnel record keyed by badge number, independent of any login account
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OfficerProfile {
    pub badge_number: String,
    pub name: String,
    pub rank: String,
    pub unit: String,
    #[sqlx(try_from = "String")]
    pub status: OfficerStatus,
    pub active_cases: i32,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Incident {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub incident_type: String,
    pub description: Option<String>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[sqlx(try_from = "String")]
    pub severity: Priority,
    #[sqlx(try_from = "String")]
    pub status: IncidentStatus,
    pub case_id: Option<String>,
    pub reported_by: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub account_id: Option<Uuid>,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(
        action: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        account_id: Option<Uuid>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            account_id,
            username: username.into(),
            created_at: Utc::now(),
        }
    }
}

fn opt_string<T: ToString>(value: &Option<T>) -> Option<String> {
    value.as_ref().map(|v| v.to_string())
}

impl FilterRecord for Account {
    fn column(&self, name: &str) -> Option<String> {
        match name {
            "role" => Some(self.role.to_string()),
            "status" => Some(self.status.to_string()),
            "department" => self.department.clone(),
            "username" => Some(self.username.clone()),
            "name" => Some(self.name.clone()),
            "email" => Some(self.email.clone()),
            _ => None,
        }
    }
}

impl FilterRecord for Case {
    fn column(&self, name: &str) -> Option<String> {
        match name {
            "case_id" => Some(self.case_id.clone()),
            "title" => self.title.clone(),
            "case_type" => Some(self.case_type.clone()),
            "description" => self.description.clone(),
            "location" => Some(self.location.clone()),
            "status" => Some(self.status.to_string()),
            "priority" => Some(self.priority.to_string()),
            "assigned_to" => opt_string(&self.assigned_to),
            _ => None,
        }
    }
}

impl FilterRecord for Report {
    fn column(&self, name: &str) -> Option<String> {
        match name {
            "report_id" => Some(self.report_id.clone()),
            "title" => Some(self.title.clone()),
            "report_type" => Some(self.report_type.clone()),
            "content" => Some(self.content.clone()),
            "case_id" => self.case_id.clone(),
            _ => None,
        }
    }
}

impl FilterRecord for OfficerProfile {
    fn column(&self, name: &str) -> Option<String> {
        match name {
            "badge_number" => Some(self.badge_number.clone()),
            "name" => Some(self.name.clone()),
            "rank" => Some(self.rank.clone()),
            "unit" => Some(self.unit.clone()),
            "status" => Some(self.status.to_string()),
            _ => None,
        }
    }
}

impl FilterRecord for Incident {
    fn column(&self, name: &str) -> Option<String> {
        match name {
            "title" => Some(self.title.clone()),
            "incident_type" => Some(self.incident_type.clone()),
            "description" => self.description.clone(),
            "location" => Some(self.location.clone()),
            "severity" => Some(self.severity.to_string()),
            "status" => Some(self.status.to_string()),
            "case_id" => self.case_id.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_enums_parse_case_insensitively() {
        assert_eq!("Investigation".parse::<CaseStatus>().unwrap(), CaseStatus::Investigation);
        assert_eq!(" high ".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("on_leave".parse::<OfficerStatus>().unwrap(), OfficerStatus::OnLeave);
    }

    #[test]
    fn unknown_variant_names_the_kind() {
        let err = "closed".parse::<CaseStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown case status value 'closed'");
    }

    #[test]
    fn enums_serialize_as_text() {
        assert_eq!(serde_json::to_value(OfficerStatus::OnLeave).unwrap(), "on_leave");
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "admin");
    }

    #[test]
    fn account_serialization_hides_password_hash() {
        let account = Account {
            id: Uuid::new_v4(),
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            name: "Admin".to_string(),
            department: None,
            badge_number: None,
            role: Role::Admin,
            status: AccountStatus::Active,
            password_hash: "$argon2id$secret".to_string(),
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&account).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["role"], "admin");
    }
}
