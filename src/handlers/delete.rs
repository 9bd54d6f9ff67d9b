use crate::error::GatewayError;
use crate::models::{Action, GatewayResponse, RequestEnvelope};
use crate::store::KvStore;

/// `delete` - remove `key`, whether or not it exists
pub async fn delete_action(
    store: &dyn KvStore,
    request: &RequestEnvelope,
) -> Result<GatewayResponse, GatewayError> {
    let key = request
        .key
        .as_deref()
        .ok_or(GatewayError::MissingKey(Action::Delete))?;

    store.delete(key).await?;

    tracing::info!("Deleted key: {}", key);
    Ok(GatewayResponse::success("Value deleted"))
}
