use crate::error::GatewayError;
use crate::models::{GatewayResponse, ListResult, RequestEnvelope};
use crate::store::KvStore;

/// `list` - one page of key names
///
/// `cursor` and `limit` are passed to the store only when supplied. With
/// `content`, only keys whose current value contains it are returned. Each
/// value is fetched and checked in listing order before the next one, so the
/// filtered keys keep the store's order; keys deleted in the meantime are
/// dropped.
pub async fn list_action(
    store: &dyn KvStore,
    request: &RequestEnvelope,
) -> Result<GatewayResponse, GatewayError> {
    let options = request.list_options();
    let page = store.list(options.clone()).await?;
    let listed = page.keys.len();

    let keys = match request.content.as_deref() {
        Some(needle) => {
            let mut matching = Vec::new();
            for entry in page.keys {
                let found = store
                    .get(&entry.name)
                    .await?
                    .is_some_and(|value| value.contains(needle));
                if found {
                    matching.push(entry.name);
                }
            }
            matching
        }
        None => page.keys.into_iter().map(|entry| entry.name).collect(),
    };

    let cursor = if page.list_complete { None } else { page.cursor };

    tracing::info!(
        "Listed {} keys ({} matched, cursor: {:?}, limit: {:?}, next: {:?})",
        listed,
        keys.len(),
        options.cursor,
        options.limit,
        cursor
    );

    Ok(GatewayResponse::success(ListResult { keys, cursor }))
}
