//! Dashboard figures. Each number comes from its own count query so the
//! memory and PostgreSQL stores share one code path.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::database::models::{CaseStatus, OfficerStatus, Priority};
use crate::database::{DatabaseError, Store};
use crate::filter::Filter;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Statistics {
    pub total_cases: i64,
    pub open: i64,
    pub investigation: i64,
    pub resolved: i64,
    pub others: i64,
    pub high_priority: i64,
    pub total_officers: i64,
    pub active_officers: i64,
    pub total_reports: i64,
    pub total_incidents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseDistribution {
    pub by_status: BTreeMap<String, i64>,
    pub by_priority: BTreeMap<String, i64>,
    pub by_type: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PersonnelStatus {
    pub active: i64,
    pub on_leave: i64,
    pub inactive: i64,
    pub total: i64,
}

/// Cases in none of the known statuses; never negative
pub fn others(total: i64, open: i64, investigation: i64, resolved: i64) -> i64 {
    (total - open - investigation - resolved).max(0)
}

pub async fn statistics(store: &dyn Store) -> Result<Statistics, DatabaseError> {
    let all = Filter::default();

    let total_cases = store.count_cases(&all).await?;
    let open = store.count_cases(&Filter::eq("status", CaseStatus::Open)).await?;
    let investigation = store.count_cases(&Filter::eq("status", CaseStatus::Investigation)).await?;
    let resolved = store.count_cases(&Filter::eq("status", CaseStatus::Resolved)).await?;
    let high_priority = store.count_cases(&Filter::eq("priority", Priority::High)).await?;

    let total_officers = store.count_officers(&all).await?;
    let active_officers = store.count_officers(&Filter::eq("status", OfficerStatus::Active)).await?;

    Ok(Statistics {
        total_cases,
        open,
        investigation,
        resolved,
        others: others(total_cases, open, investigation, resolved),
        high_priority,
        total_officers,
        active_officers,
        total_reports: store.count_reports(&all).await?,
        total_incidents: store.count_incidents(&all).await?,
    })
}

pub async fn case_distribution(store: &dyn Store) -> Result<CaseDistribution, DatabaseError> {
    let mut by_status = BTreeMap::new();
    for status in CaseStatus::ALL {
        let count = store.count_cases(&Filter::eq("status", status)).await?;
        by_status.insert(status.to_string(), count);
    }

    let mut by_priority = BTreeMap::new();
    for priority in Priority::ALL {
        let count = store.count_cases(&Filter::eq("priority", priority)).await?;
        by_priority.insert(priority.to_string(), count);
    }

    let by_type = store.count_cases_by_type().await?.into_iter().collect();

    Ok(CaseDistribution {
        by_status,
        by_priority,
        by_type,
    })
}

pub async fn personnel_status(store: &dyn Store) -> Result<PersonnelStatus, DatabaseError> {
    Ok(PersonnelStatus {
        active: store.count_officers(&Filter::eq("status", OfficerStatus::Active)).await?,
        on_leave: store.count_officers(&Filter::eq("status", OfficerStatus::OnLeave)).await?,
        inactive: store.count_officers(&Filter::eq("status", OfficerStatus::Inactive)).await?,
        total: store.count_officers(&Filter::default()).await?,
    })
}
