use crate::error::GatewayError;
use crate::models::{Action, GatewayResponse, RequestEnvelope};
use crate::store::KvStore;

/// `read` - return the value stored under `key`
pub async fn read_action(
    store: &dyn KvStore,
    request: &RequestEnvelope,
) -> Result<GatewayResponse, GatewayError> {
    let key = request
        .key
        .as_deref()
        .ok_or(GatewayError::MissingKey(Action::Read))?;

    match store.get(key).await? {
        Some(value) => {
            tracing::info!("Read value for key: {}", key);
            Ok(GatewayResponse::success(value))
        }
        None => {
            tracing::info!("Value not found for key: {}", key);
            Err(GatewayError::ValueNotFound)
        }
    }
}
