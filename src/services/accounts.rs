use chrono::Utc;
use uuid::Uuid;

use crate::auth::password::{check_strength, hash_password, is_valid_email};
use crate::config::BootstrapConfig;
use crate::database::models::{Account, AccountChanges, AccountStatus, Role};
use crate::database::{DatabaseError, Store};
use crate::error::ApiError;
use crate::filter::Filter;

/// Validated input for a new login account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub department: Option<String>,
    pub badge_number: Option<String>,
    pub role: Role,
}

/// Validate, hash and store a new account. Shared by registration, the users API and the CLI.
pub async fn create_account(store: &dyn Store, new: NewAccount) -> Result<Account, ApiError> {
    let username = new.username.trim().to_string();
    let email = new.email.trim().to_string();

    if !is_valid_email(&email) {
        return Err(ApiError::InvalidEmail);
    }
    check_strength(&new.password).map_err(ApiError::WeakPassword)?;
    ensure_unique(store, Some(&username), Some(&email), None).await?;

    let now = Utc::now();
    let account = Account {
        id: Uuid::new_v4(),
        username,
        email,
        name: new.name.trim().to_string(),
        department: non_blank(new.department),
        badge_number: non_blank(new.badge_number),
        role: new.role,
        status: AccountStatus::Active,
        password_hash: hash_password(&new.password)?,
        last_login: None,
        created_at: now,
        updated_at: now,
    };

    store.insert_account(&account).await.map_err(account_conflict)?;
    tracing::info!("Created {} account '{}'", account.role, account.username);

    Ok(account)
}

/// Reject a username or email already held by another account
pub async fn ensure_unique(
    store: &dyn Store,
    username: Option<&str>,
    email: Option<&str>,
    except: Option<Uuid>,
) -> Result<(), ApiError> {
    let other = |account: &Account| Some(account.id) != except;

    if let Some(username) = username {
        if store.find_account_by_username(username).await?.filter(other).is_some() {
            return Err(ApiError::DuplicateUsername);
        }
    }
    if let Some(email) = email {
        if store.find_account_by_email(email).await?.filter(other).is_some() {
            return Err(ApiError::DuplicateEmail);
        }
    }
    Ok(())
}

/// Write the changed columns of an account, translating unique-index races into the dedicated codes
pub async fn save_account(store: &dyn Store, id: Uuid, changes: &AccountChanges) -> Result<Account, ApiError> {
    store.update_account(id, changes, Utc::now()).await.map_err(|err| match err {
        DatabaseError::NotFound(_) => ApiError::UserNotFound,
        other => account_conflict(other),
    })
}

/// Create the configured admin account when no account exists yet
pub async fn bootstrap_admin(store: &dyn Store, bootstrap: &BootstrapConfig) -> Result<Option<Account>, ApiError> {
    let (Some(username), Some(password)) = (&bootstrap.admin_username, &bootstrap.admin_password) else {
        return Ok(None);
    };

    if store.count_accounts(&Filter::default()).await? > 0 {
        tracing::debug!("Accounts already present, skipping admin bootstrap");
        return Ok(None);
    }

    let account = create_account(
        store,
        NewAccount {
            username: username.clone(),
            email: format!("{}@precinct.local", username.trim()),
            password: password.clone(),
            name: "Administrator".to_string(),
            department: None,
            badge_number: None,
            role: Role::Admin,
        },
    )
    .await?;

    tracing::warn!("Bootstrapped admin account '{}'; change its password", account.username);
    Ok(Some(account))
}

/// Fields any account may change on itself
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub badge_number: Option<String>,
}

/// Validate the present profile fields of `account_id` into column changes
pub async fn profile_changes(
    store: &dyn Store,
    account_id: Uuid,
    update: ProfileUpdate,
) -> Result<AccountChanges, ApiError> {
    let mut changes = AccountChanges::default();

    if let Some(name) = update.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::validation_error("Name cannot be empty"));
        }
        changes.name = Some(name);
    }

    if let Some(email) = update.email {
        let email = email.trim().to_string();
        if !is_valid_email(&email) {
            return Err(ApiError::InvalidEmail);
        }
        ensure_unique(store, None, Some(&email), Some(account_id)).await?;
        changes.email = Some(email);
    }

    if update.department.is_some() {
        changes.department = Some(non_blank(update.department));
    }
    if update.badge_number.is_some() {
        changes.badge_number = Some(non_blank(update.badge_number));
    }

    Ok(changes)
}

fn account_conflict(err: DatabaseError) -> ApiError {
    match err {
        DatabaseError::Conflict(constraint) if constraint.contains("username") => ApiError::DuplicateUsername,
        DatabaseError::Conflict(constraint) if constraint.contains("email") => ApiError::DuplicateEmail,
        other => other.into(),
    }
}

/// Trimmed value, or `None` when absent or blank
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn officer(username: &str, email: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            email: email.to_string(),
            password: "patrol2024".to_string(),
            name: "Ada Okafor".to_string(),
            department: Some("  ".to_string()),
            badge_number: Some("B-77".to_string()),
            role: Role::Officer,
        }
    }

    #[tokio::test]
    async fn creates_active_account_with_hashed_password() {
        let store = MemoryStore::new();
        let account = create_account(&store, officer(" ada ", "ada@precinct.gov")).await.unwrap();

        assert_eq!(account.username, "ada");
        assert_eq!(account.status, AccountStatus::Active);
        assert_eq!(account.department, None);
        assert_ne!(account.password_hash, "patrol2024");
        assert!(store.find_account(account.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_username_and_email_are_distinguished() {
        let store = MemoryStore::new();
        create_account(&store, officer("ada", "ada@precinct.gov")).await.unwrap();

        let err = create_account(&store, officer("ADA", "other@precinct.gov")).await.unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_USERNAME");

        let err = create_account(&store, officer("bola", "Ada@Precinct.gov")).await.unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_EMAIL");
    }

    #[tokio::test]
    async fn rejects_bad_email_and_weak_password() {
        let store = MemoryStore::new();

        let err = create_account(&store, officer("ada", "not-an-email")).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_EMAIL");

        let mut weak = officer("ada", "ada@precinct.gov");
        weak.password = "short".to_string();
        let err = create_account(&store, weak).await.unwrap_err();
        assert_eq!(err.error_code(), "WEAK_PASSWORD");
    }

    #[tokio::test]
    async fn ensure_unique_ignores_the_account_itself() {
        let store = MemoryStore::new();
        let account = create_account(&store, officer("ada", "ada@precinct.gov")).await.unwrap();

        assert!(ensure_unique(&store, Some("ada"), Some("ada@precinct.gov"), Some(account.id)).await.is_ok());
        assert!(ensure_unique(&store, Some("ada"), None, None).await.is_err());
    }

    #[tokio::test]
    async fn bootstrap_only_runs_on_an_empty_store() {
        let store = MemoryStore::new();
        let bootstrap = BootstrapConfig {
            admin_username: Some("chief".to_string()),
            admin_password: Some("precinct42".to_string()),
        };

        let admin = bootstrap_admin(&store, &bootstrap).await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(bootstrap_admin(&store, &bootstrap).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bootstrap_is_skipped_without_credentials() {
        let store = MemoryStore::new();
        assert!(bootstrap_admin(&store, &BootstrapConfig::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_changes_carry_only_present_fields() {
        let store = MemoryStore::new();
        let account = create_account(&store, officer("ada", "ada@precinct.gov")).await.unwrap();

        let update = ProfileUpdate {
            name: Some(" Ada O. ".to_string()),
            department: Some(" ".to_string()),
            ..Default::default()
        };
        let changes = profile_changes(&store, account.id, update).await.unwrap();
        assert_eq!(
            changes,
            AccountChanges { name: Some("Ada O.".to_string()), department: Some(None), ..Default::default() }
        );

        let stored = save_account(&store, account.id, &changes).await.unwrap();
        assert_eq!(stored.name, "Ada O.");
        assert_eq!(stored.badge_number.as_deref(), Some("B-77"));
        assert_eq!(stored.password_hash, account.password_hash);
    }

    #[tokio::test]
    async fn profile_changes_reject_a_taken_email() {
        let store = MemoryStore::new();
        create_account(&store, officer("ada", "ada@precinct.gov")).await.unwrap();
        let bola = create_account(&store, officer("bola", "bola@precinct.gov")).await.unwrap();

        let update = ProfileUpdate { email: Some("ada@precinct.gov".to_string()), ..Default::default() };
        let err = profile_changes(&store, bola.id, update).await.unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_EMAIL");

        let err = save_account(&store, Uuid::new_v4(), &AccountChanges::default()).await.unwrap_err();
        assert_eq!(err.error_code(), "USER_NOT_FOUND");
    }
}
