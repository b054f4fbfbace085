use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::filter::{Filter, FilterRecord, Page, Paginated};
use super::manager::DatabaseError;
use super::models::{Account, AccountChanges, ActivityEntry, Case, Incident, OfficerProfile, Report};
use super::sequence::{max_suffix, SequenceKind};
use super::store::Store;

/// Process-local store. Rows are kept in insertion order; one lock guards all
/// tables so sequence allocation and uniqueness checks are atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    accounts: Vec<Account>,
    cases: Vec<Case>,
    reports: Vec<Report>,
    officers: Vec<OfficerProfile>,
    incidents: Vec<Incident>,
    activity: Vec<ActivityEntry>,
    sequences: HashMap<SequenceKind, i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page_of<T: Clone + FilterRecord>(rows: &[T], filter: &Filter, page: Page) -> Paginated<T> {
    let matching: Vec<&T> = rows.iter().rev().filter(|row| filter.matches(*row)).collect();
    let total = matching.len() as i64;
    let items = matching
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .cloned()
        .collect();
    Paginated { items, total }
}

fn count_of<T: FilterRecord>(rows: &[T], filter: &Filter) -> i64 {
    rows.iter().filter(|row| filter.matches(*row)).count() as i64
}

fn replace<T>(rows: &mut [T], updated: &T, same: impl Fn(&T) -> bool, what: &str) -> Result<(), DatabaseError>
where
    T: Clone,
{
    let slot = rows
        .iter_mut()
        .find(|row| same(&**row))
        .ok_or_else(|| DatabaseError::NotFound(format!("{} not found", what)))?;
    *slot = updated.clone();
    Ok(())
}

fn remove<T>(rows: &mut Vec<T>, same: impl Fn(&T) -> bool) -> bool {
    let before = rows.len();
    rows.retain(|row| !same(row));
    rows.len() != before
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn next_sequence(&self, kind: SequenceKind) -> Result<i64, DatabaseError> {
        let mut tables = self.tables.write().await;
        let current = match tables.sequences.get(&kind) {
            Some(value) => *value,
            None => match kind {
                SequenceKind::Case => max_suffix(kind, tables.cases.iter().map(|c| c.case_id.as_str())),
                SequenceKind::Report => max_suffix(kind, tables.reports.iter().map(|r| r.report_id.as_str())),
            },
        };
        let next = current + 1;
        tables.sequences.insert(kind, next);
        Ok(next)
    }

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.accounts.iter().find(|a| a.username.eq_ignore_ascii_case(username)).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.accounts.iter().find(|a| a.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn list_accounts(&self, filter: &Filter, page: Page) -> Result<Paginated<Account>, DatabaseError> {
        Ok(page_of(&self.tables.read().await.accounts, filter, page))
    }

    async fn count_accounts(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        Ok(count_of(&self.tables.read().await.accounts, filter))
    }

    async fn insert_account(&self, account: &Account) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.accounts.iter().any(|a| a.username.eq_ignore_ascii_case(&account.username)) {
            return Err(DatabaseError::Conflict("accounts_username_key".to_string()));
        }
        if tables.accounts.iter().any(|a| a.email.eq_ignore_ascii_case(&account.email)) {
            return Err(DatabaseError::Conflict("accounts_email_key".to_string()));
        }
        tables.accounts.push(account.clone());
        Ok(())
    }

    async fn update_account(&self, id: Uuid, changes: &AccountChanges, at: DateTime<Utc>) -> Result<Account, DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &changes.email {
            if tables.accounts.iter().any(|a| a.id != id && a.email.eq_ignore_ascii_case(email)) {
                return Err(DatabaseError::Conflict("accounts_email_key".to_string()));
            }
        }
        let account = tables
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("account {} not found", id)))?;
        account.apply(changes, at);
        Ok(account.clone())
    }

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let account = tables
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("account {} not found", id)))?;
        account.last_login = Some(at);
        Ok(())
    }

    async fn delete_account(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(remove(&mut self.tables.write().await.accounts, |a| a.id == id))
    }

    async fn find_case(&self, case_id: &str) -> Result<Option<Case>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.cases.iter().find(|c| c.case_id == case_id).cloned())
    }

    async fn list_cases(&self, filter: &Filter, page: Page) -> Result<Paginated<Case>, DatabaseError> {
        Ok(page_of(&self.tables.read().await.cases, filter, page))
    }

    async fn count_cases(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        Ok(count_of(&self.tables.read().await.cases, filter))
    }

    async fn count_cases_by_type(&self) -> Result<Vec<(String, i64)>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut counts: HashMap<String, i64> = HashMap::new();
        for case in &tables.cases {
            *counts.entry(case.case_type.to_lowercase()).or_default() += 1;
        }
        let mut grouped: Vec<(String, i64)> = counts.into_iter().collect();
        grouped.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(grouped)
    }

    async fn insert_case(&self, case: &Case) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.cases.iter().any(|c| c.case_id == case.case_id) {
            return Err(DatabaseError::Conflict("cases_pkey".to_string()));
        }
        tables.cases.push(case.clone());
        Ok(())
    }

    async fn update_case(&self, case: &Case) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.cases, case, |c| c.case_id == case.case_id, "case")
    }

    async fn delete_case(&self, case_id: &str) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !remove(&mut tables.cases, |c| c.case_id == case_id) {
            return Ok(false);
        }

        let linked = Some(case_id);
        for report in tables.reports.iter_mut().filter(|r| r.case_id.as_deref() == linked) {
            report.case_id = None;
        }
        for incident in tables.incidents.iter_mut().filter(|i| i.case_id.as_deref() == linked) {
            incident.case_id = None;
        }
        Ok(true)
    }

    async fn find_report(&self, report_id: &str) -> Result<Option<Report>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.reports.iter().find(|r| r.report_id == report_id).cloned())
    }

    async fn list_reports(&self, filter: &Filter, page: Page) -> Result<Paginated<Report>, DatabaseError> {
        Ok(page_of(&self.tables.read().await.reports, filter, page))
    }

    async fn count_reports(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        Ok(count_of(&self.tables.read().await.reports, filter))
    }

    async fn insert_report(&self, report: &Report) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.reports.iter().any(|r| r.report_id == report.report_id) {
            return Err(DatabaseError::Conflict("reports_pkey".to_string()));
        }
        tables.reports.push(report.clone());
        Ok(())
    }

    async fn delete_report(&self, report_id: &str) -> Result<bool, DatabaseError> {
        Ok(remove(&mut self.tables.write().await.reports, |r| r.report_id == report_id))
    }

    async fn find_officer(&self, badge_number: &str) -> Result<Option<OfficerProfile>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.officers.iter().find(|o| o.badge_number == badge_number).cloned())
    }

    async fn list_officers(&self, filter: &Filter, page: Page) -> Result<Paginated<OfficerProfile>, DatabaseError> {
        Ok(page_of(&self.tables.read().await.officers, filter, page))
    }

    async fn count_officers(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        Ok(count_of(&self.tables.read().await.officers, filter))
    }

    async fn insert_officer(&self, officer: &OfficerProfile) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.officers.iter().any(|o| o.badge_number == officer.badge_number) {
            return Err(DatabaseError::Conflict("officers_pkey".to_string()));
        }
        tables.officers.push(officer.clone());
        Ok(())
    }

    async fn update_officer(&self, officer: &OfficerProfile) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.officers, officer, |o| o.badge_number == officer.badge_number, "officer")
    }

    async fn delete_officer(&self, badge_number: &str) -> Result<bool, DatabaseError> {
        Ok(remove(&mut self.tables.write().await.officers, |o| o.badge_number == badge_number))
    }

    async fn find_incident(&self, id: Uuid) -> Result<Option<Incident>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.incidents.iter().find(|i| i.id == id).cloned())
    }

    async fn list_incidents(&self, filter: &Filter, page: Page) -> Result<Paginated<Incident>, DatabaseError> {
        Ok(page_of(&self.tables.read().await.incidents, filter, page))
    }

    async fn count_incidents(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        Ok(count_of(&self.tables.read().await.incidents, filter))
    }

    async fn insert_incident(&self, incident: &Incident) -> Result<(), DatabaseError> {
        self.tables.write().await.incidents.push(incident.clone());
        Ok(())
    }

    async fn update_incident(&self, incident: &Incident) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.incidents, incident, |i| i.id == incident.id, "incident")
    }

    async fn delete_incident(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(remove(&mut self.tables.write().await.incidents, |i| i.id == id))
    }

    async fn append_activity(&self, entry: &ActivityEntry) -> Result<(), DatabaseError> {
        self.tables.write().await.activity.push(entry.clone());
        Ok(())
    }

    async fn recent_activity(&self, limit: u32) -> Result<Vec<ActivityEntry>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.activity.iter().rev().take(limit as usize).cloned().collect())
    }
}
