use crate::database::models::ActivityEntry;
use crate::database::Store;
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// Append an audit entry for a mutation performed by `actor`
pub async fn record(
    store: &dyn Store,
    actor: &AuthUser,
    action: &str,
    entity_type: &str,
    entity_id: &str,
) -> Result<(), ApiError> {
    let entry = ActivityEntry::new(action, entity_type, entity_id, Some(actor.id), actor.username.clone());
    store.append_activity(&entry).await?;
    tracing::info!("{} {} {} by '{}'", action, entity_type, entity_id, actor.username);
    Ok(())
}
