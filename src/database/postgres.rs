use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::filter::{Filter, Page, Paginated};
use super::manager::DatabaseError;
use super::models::{Account, AccountChanges, ActivityEntry, Case, Incident, OfficerProfile, Report};
use super::repository::Repository;
use super::sequence::SequenceKind;
use super::store::Store;

pub struct PgStore {
    pool: PgPool,
    accounts: Repository<Account>,
    cases: Repository<Case>,
    reports: Repository<Report>,
    officers: Repository<OfficerProfile>,
    incidents: Repository<Incident>,
    activity: Repository<ActivityEntry>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            accounts: Repository::new("accounts", "id", pool.clone()),
            cases: Repository::new("cases", "case_id", pool.clone()),
            reports: Repository::new("reports", "report_id", pool.clone()),
            officers: Repository::new("officers", "badge_number", pool.clone()),
            incidents: Repository::new("incidents", "id", pool.clone()),
            activity: Repository::new("activity_log", "id", pool.clone()),
            pool,
        }
    }

    fn not_found(what: &str, key: impl std::fmt::Display) -> DatabaseError {
        DatabaseError::NotFound(format!("{} {} not found", what, key))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn next_sequence(&self, kind: SequenceKind) -> Result<i64, DatabaseError> {
        let (name, suffix_from, pattern) = sequence_binds(kind);
        let row = sqlx::query(&sequence_sql(kind))
            .bind(name)
            .bind(suffix_from)
            .bind(pattern)
            .fetch_one(&self.pool)
            .await?;
        let value: i64 = row.try_get("value")?;
        Ok(value)
    }

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, DatabaseError> {
        self.accounts.select_by_id(id).await
    }

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>, DatabaseError> {
        self.accounts.select_by_column("username", username).await
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, DatabaseError> {
        self.accounts.select_by_column("email", email).await
    }

    async fn list_accounts(&self, filter: &Filter, page: Page) -> Result<Paginated<Account>, DatabaseError> {
        self.accounts.select_page(filter, page).await
    }

    async fn count_accounts(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        self.accounts.count(filter).await
    }

    async fn insert_account(&self, account: &Account) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO accounts
                (id, username, email, name, department, badge_number, role, status,
                 password_hash, last_login, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.name)
        .bind(&account.department)
        .bind(&account.badge_number)
        .bind(account.role.as_str())
        .bind(account.status.as_str())
        .bind(&account.password_hash)
        .bind(account.last_login)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_account(&self, id: Uuid, changes: &AccountChanges, at: DateTime<Utc>) -> Result<Account, DatabaseError> {
        let (sql, params) = account_update_sql(changes);
        let mut q = sqlx::query_as::<_, Account>(&sql).bind(id).bind(at);
        for p in params {
            q = q.bind(p);
        }

        q.fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found("account", id))
    }

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE accounts SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found("account", id));
        }
        Ok(())
    }

    async fn delete_account(&self, id: Uuid) -> Result<bool, DatabaseError> {
        self.accounts.delete_by_id(id).await
    }

    async fn find_case(&self, case_id: &str) -> Result<Option<Case>, DatabaseError> {
        self.cases.select_by_key(case_id).await
    }

    async fn list_cases(&self, filter: &Filter, page: Page) -> Result<Paginated<Case>, DatabaseError> {
        self.cases.select_page(filter, page).await
    }

    async fn count_cases(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        self.cases.count(filter).await
    }

    async fn count_cases_by_type(&self) -> Result<Vec<(String, i64)>, DatabaseError> {
        let rows = sqlx::query(
            r#"
            SELECT LOWER(case_type) AS case_type, COUNT(*) AS count
            FROM cases
            GROUP BY LOWER(case_type)
            ORDER BY count DESC, case_type
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok((row.try_get("case_type")?, row.try_get("count")?)))
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(DatabaseError::from)
    }

    async fn insert_case(&self, case: &Case) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO cases
                (case_id, title, case_type, description, location, status, priority,
                 created_by, assigned_to, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&case.case_id)
        .bind(&case.title)
        .bind(&case.case_type)
        .bind(&case.description)
        .bind(&case.location)
        .bind(case.status.as_str())
        .bind(case.priority.as_str())
        .bind(case.created_by)
        .bind(case.assigned_to)
        .bind(case.created_at)
        .bind(case.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_case(&self, case: &Case) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE cases SET
                title = $2, case_type = $3, description = $4, location = $5, status = $6,
                priority = $7, assigned_to = $8, updated_at = $9
            WHERE case_id = $1
            "#,
        )
        .bind(&case.case_id)
        .bind(&case.title)
        .bind(&case.case_type)
        .bind(&case.description)
        .bind(&case.location)
        .bind(case.status.as_str())
        .bind(case.priority.as_str())
        .bind(case.assigned_to)
        .bind(case.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found("case", &case.case_id));
        }
        Ok(())
    }

    async fn delete_case(&self, case_id: &str) -> Result<bool, DatabaseError> {
        self.cases.delete_by_key(case_id).await
    }

    async fn find_report(&self, report_id: &str) -> Result<Option<Report>, DatabaseError> {
        self.reports.select_by_key(report_id).await
    }

    async fn list_reports(&self, filter: &Filter, page: Page) -> Result<Paginated<Report>, DatabaseError> {
        self.reports.select_page(filter, page).await
    }

    async fn count_reports(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        self.reports.count(filter).await
    }

    async fn insert_report(&self, report: &Report) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO reports (report_id, title, report_type, content, case_id, generated_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&report.report_id)
        .bind(&report.title)
        .bind(&report.report_type)
        .bind(&report.content)
        .bind(&report.case_id)
        .bind(report.generated_by)
        .bind(report.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_report(&self, report_id: &str) -> Result<bool, DatabaseError> {
        self.reports.delete_by_key(report_id).await
    }

    async fn find_officer(&self, badge_number: &str) -> Result<Option<OfficerProfile>, DatabaseError> {
        self.officers.select_by_key(badge_number).await
    }

    async fn list_officers(&self, filter: &Filter, page: Page) -> Result<Paginated<OfficerProfile>, DatabaseError> {
        self.officers.select_page(filter, page).await
    }

    async fn count_officers(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        self.officers.count(filter).await
    }

    async fn insert_officer(&self, officer: &OfficerProfile) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO officers
                (badge_number, name, rank, unit, status, active_cases, email, phone, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&officer.badge_number)
        .bind(&officer.name)
        .bind(&officer.rank)
        .bind(&officer.unit)
        .bind(officer.status.as_str())
        .bind(officer.active_cases)
        .bind(&officer.email)
        .bind(&officer.phone)
        .bind(officer.created_at)
        .bind(officer.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_officer(&self, officer: &OfficerProfile) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE officers SET
                name = $2, rank = $3, unit = $4, status = $5, active_cases = $6,
                email = $7, phone = $8, updated_at = $9
            WHERE badge_number = $1
            "#,
        )
        .bind(&officer.badge_number)
        .bind(&officer.name)
        .bind(&officer.rank)
        .bind(&officer.unit)
        .bind(officer.status.as_str())
        .bind(officer.active_cases)
        .bind(&officer.email)
        .bind(&officer.phone)
        .bind(officer.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found("officer", &officer.badge_number));
        }
        Ok(())
    }

    async fn delete_officer(&self, badge_number: &str) -> Result<bool, DatabaseError> {
        self.officers.delete_by_key(badge_number).await
    }

    async fn find_incident(&self, id: Uuid) -> Result<Option<Incident>, DatabaseError> {
        self.incidents.select_by_id(id).await
    }

    async fn list_incidents(&self, filter: &Filter, page: Page) -> Result<Paginated<Incident>, DatabaseError> {
        self.incidents.select_page(filter, page).await
    }

    async fn count_incidents(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        self.incidents.count(filter).await
    }

    async fn insert_incident(&self, incident: &Incident) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO incidents
                (id, title, incident_type, description, location, latitude, longitude, severity,
                 status, case_id, reported_by, occurred_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(incident.id)
        .bind(&incident.title)
        .bind(&incident.incident_type)
        .bind(&incident.description)
        .bind(&incident.location)
        .bind(incident.latitude)
        .bind(incident.longitude)
        .bind(incident.severity.as_str())
        .bind(incident.status.as_str())
        .bind(&incident.case_id)
        .bind(incident.reported_by)
        .bind(incident.occurred_at)
        .bind(incident.created_at)
        .bind(incident.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_incident(&self, incident: &Incident) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE incidents SET
                title = $2, incident_type = $3, description = $4, location = $5, latitude = $6,
                longitude = $7, severity = $8, status = $9, case_id = $10, occurred_at = $11,
                updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(incident.id)
        .bind(&incident.title)
        .bind(&incident.incident_type)
        .bind(&incident.description)
        .bind(&incident.location)
        .bind(incident.latitude)
        .bind(incident.longitude)
        .bind(incident.severity.as_str())
        .bind(incident.status.as_str())
        .bind(&incident.case_id)
        .bind(incident.occurred_at)
        .bind(incident.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found("incident", incident.id));
        }
        Ok(())
    }

    async fn delete_incident(&self, id: Uuid) -> Result<bool, DatabaseError> {
        self.incidents.delete_by_id(id).await
    }

    async fn append_activity(&self, entry: &ActivityEntry) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO activity_log (id, action, entity_type, entity_id, account_id, username, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(&entry.action)
        .bind(&entry.entity_type)
        .bind(&entry.entity_id)
        .bind(entry.account_id)
        .bind(&entry.username)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent_activity(&self, limit: u32) -> Result<Vec<ActivityEntry>, DatabaseError> {
        self.activity.select_latest(limit).await
    }
}

/// Single statement: the row lock on id_sequences serializes concurrent allocations.
/// The first allocation of a kind seeds the counter from the highest stored code.
fn sequence_sql(kind: SequenceKind) -> String {
    let (table, column) = kind.source();
    format!(
        r#"
        INSERT INTO id_sequences (kind, value)
        VALUES ($1, (
            SELECT COALESCE(MAX(CAST(SUBSTRING("{column}" FROM $2) AS BIGINT)), 0)
            FROM "{table}"
            WHERE "{column}" ~ $3
        ) + 1)
        ON CONFLICT (kind) DO UPDATE SET value = id_sequences.value + 1
        RETURNING value
        "#,
    )
}

/// Bound values for `sequence_sql`: kind name, 1-based suffix offset, code pattern
fn sequence_binds(kind: SequenceKind) -> (&'static str, i32, String) {
    (kind.name(), kind.prefix().len() as i32 + 1, format!("^{}[0-9]+$", kind.prefix()))
}

/// `UPDATE accounts` over the changed columns only. `$1` is the id and `$2` the
/// new `updated_at`; the returned params bind from `$3` on.
fn account_update_sql(changes: &AccountChanges) -> (String, Vec<Option<String>>) {
    let mut sets = vec!["updated_at = $2".to_string()];
    let mut params: Vec<Option<String>> = Vec::new();
    let mut set = |column: &str, value: Option<String>| {
        params.push(value);
        sets.push(format!("{} = ${}", column, params.len() + 2));
    };

    if let Some(name) = &changes.name {
        set("name", Some(name.clone()));
    }
    if let Some(email) = &changes.email {
        set("email", Some(email.clone()));
    }
    if let Some(department) = &changes.department {
        set("department", department.clone());
    }
    if let Some(badge_number) = &changes.badge_number {
        set("badge_number", badge_number.clone());
    }
    if let Some(role) = changes.role {
        set("role", Some(role.to_string()));
    }
    if let Some(status) = changes.status {
        set("status", Some(status.to_string()));
    }
    if let Some(password_hash) = &changes.password_hash {
        set("password_hash", Some(password_hash.clone()));
    }

    let sql = format!("UPDATE accounts SET {} WHERE id = $1 RETURNING *", sets.join(", "));
    (sql, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::AccountStatus;

    #[test]
    fn sequence_statement_is_a_single_upsert() {
        let sql = sequence_sql(SequenceKind::Case);
        assert!(sql.contains("INSERT INTO id_sequences (kind, value)"));
        assert!(sql.contains(r#"FROM "cases""#));
        assert!(sql.contains(r#"SUBSTRING("case_id" FROM $2)"#));
        assert!(sql.contains("ON CONFLICT (kind) DO UPDATE SET value = id_sequences.value + 1"));
        assert!(sql.trim_end().ends_with("RETURNING value"));

        assert!(sequence_sql(SequenceKind::Report).contains(r#"FROM "reports""#));
    }

    #[test]
    fn sequence_binds_skip_the_prefix() {
        let (name, from, pattern) = sequence_binds(SequenceKind::Case);
        assert_eq!(name, SequenceKind::Case.name());
        assert_eq!(from, 4);
        assert_eq!(pattern, "^CA-[0-9]+$");

        let (_, from, pattern) = sequence_binds(SequenceKind::Report);
        assert_eq!(from, 5);
        assert_eq!(pattern, "^RPT-[0-9]+$");
    }

    #[test]
    fn account_update_writes_only_changed_columns() {
        let changes = AccountChanges {
            status: Some(AccountStatus::Inactive),
            department: Some(None),
            ..Default::default()
        };
        let (sql, params) = account_update_sql(&changes);

        assert_eq!(
            sql,
            "UPDATE accounts SET updated_at = $2, department = $3, status = $4 WHERE id = $1 RETURNING *"
        );
        assert_eq!(params, vec![None, Some("inactive".to_string())]);
        assert!(!sql.contains("password_hash"));
        assert!(!sql.contains("last_login"));
    }
}
