use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::filter::{Filter, Page, Paginated};
use super::manager::DatabaseError;
use super::models::{Account, AccountChanges, ActivityEntry, Case, Incident, OfficerProfile, Report};
use super::sequence::SequenceKind;

/// Persistence seam shared by the PostgreSQL and in-memory backends.
///
/// Inserts report `DatabaseError::Conflict` on unique-key collisions.
/// Updates and deletes report `NotFound` / `false` when the row is absent.
/// Lists are ordered newest first.
/// Deleting a case unlinks the reports and incidents that reference it.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;

    /// Atomically advance the counter for `kind`, seeding it from the highest stored code
    async fn next_sequence(&self, kind: SequenceKind) -> Result<i64, DatabaseError>;

    // Accounts
    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, DatabaseError>;
    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>, DatabaseError>;
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, DatabaseError>;
    async fn list_accounts(&self, filter: &Filter, page: Page) -> Result<Paginated<Account>, DatabaseError>;
    async fn count_accounts(&self, filter: &Filter) -> Result<i64, DatabaseError>;
    async fn insert_account(&self, account: &Account) -> Result<(), DatabaseError>;
    /// Write only the columns set in `changes` and return the stored row
    async fn update_account(&self, id: Uuid, changes: &AccountChanges, at: DateTime<Utc>) -> Result<Account, DatabaseError>;
    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DatabaseError>;
    async fn delete_account(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // Cases
    async fn find_case(&self, case_id: &str) -> Result<Option<Case>, DatabaseError>;
    async fn list_cases(&self, filter: &Filter, page: Page) -> Result<Paginated<Case>, DatabaseError>;
    async fn count_cases(&self, filter: &Filter) -> Result<i64, DatabaseError>;
    async fn count_cases_by_type(&self) -> Result<Vec<(String, i64)>, DatabaseError>;
    async fn insert_case(&self, case: &Case) -> Result<(), DatabaseError>;
    async fn update_case(&self, case: &Case) -> Result<(), DatabaseError>;
    async fn delete_case(&self, case_id: &str) -> Result<bool, DatabaseError>;

    // Reports
    async fn find_report(&self, report_id: &str) -> Result<Option<Report>, DatabaseError>;
    async fn list_reports(&self, filter: &Filter, page: Page) -> Result<Paginated<Report>, DatabaseError>;
    async fn count_reports(&self, filter: &Filter) -> Result<i64, DatabaseError>;
    async fn insert_report(&self, report: &Report) -> Result<(), DatabaseError>;
    async fn delete_report(&self, report_id: &str) -> Result<bool, DatabaseError>;

    // Officer profiles
    async fn find_officer(&self, badge_number: &str) -> Result<Option<OfficerProfile>, DatabaseError>;
    async fn list_officers(&self, filter: &Filter, page: Page) -> Result<Paginated<OfficerProfile>, DatabaseError>;
    async fn count_officers(&self, filter: &Filter) -> Result<i64, DatabaseError>;
    async fn insert_officer(&self, officer: &OfficerProfile) -> Result<(), DatabaseError>;
    async fn update_officer(&self, officer: &OfficerProfile) -> Result<(), DatabaseError>;
    async fn delete_officer(&self, badge_number: &str) -> Result<bool, DatabaseError>;

    // Incidents
    async fn find_incident(&self, id: Uuid) -> Result<Option<Incident>, DatabaseError>;
    async fn list_incidents(&self, filter: &Filter, page: Page) -> Result<Paginated<Incident>, DatabaseError>;
    async fn count_incidents(&self, filter: &Filter) -> Result<i64, DatabaseError>;
    async fn insert_incident(&self, incident: &Incident) -> Result<(), DatabaseError>;
    async fn update_incident(&self, incident: &Incident) -> Result<(), DatabaseError>;
    async fn delete_incident(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // Activity log (append-only)
    async fn append_activity(&self, entry: &ActivityEntry) -> Result<(), DatabaseError>;
    async fn recent_activity(&self, limit: u32) -> Result<Vec<ActivityEntry>, DatabaseError>;
}
