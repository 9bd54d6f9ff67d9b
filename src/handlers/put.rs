use axum::http::StatusCode;

use crate::error::GatewayError;
use crate::models::{GatewayResponse, RequestEnvelope};
use crate::store::KvStore;

/// `put` - create or update the value under `key`
///
/// Writing the value that is already stored is skipped and reported with
/// `isSuccess: false` and a 200 status. The existence check and the write
/// are separate store calls and are not atomic.
pub async fn put_action(
    store: &dyn KvStore,
    request: &RequestEnvelope,
) -> Result<GatewayResponse, GatewayError> {
    let (Some(key), Some(content)) = (request.key.as_deref(), request.content.as_deref()) else {
        return Err(GatewayError::MissingKeyOrContent);
    };

    let existing = store.get(key).await?;
    if existing.as_deref() == Some(content) {
        tracing::info!("Skipped write for key {}: content unchanged", key);
        return Ok(GatewayResponse::new(
            StatusCode::OK,
            false,
            "Content is identical to the existing value, no update performed",
        ));
    }

    store.put(key, content).await?;

    let message = if existing.is_none() {
        "create action completed"
    } else {
        "update action completed"
    };
    tracing::info!("Stored value for key {}: {}", key, message);
    Ok(GatewayResponse::success(message))
}

#[cfg(test)]
mod tests {
    use crate::store::KvStore;
    use crate::test_support::{CountingStore, call, test_app};
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    fn put(key: &str, content: &str) -> serde_json::Value {
        json!({ "action": "put", "key": key, "content": content })
    }

    #[tokio::test]
    async fn test_put_creates_then_read_returns_it() {
        let app = test_app(Arc::new(CountingStore::default()));

        let (status, body) = call(&app, put("note", "first draft")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "status": 200, "isSuccess": true, "result": "create action completed" })
        );

        let (status, body) = call(&app, json!({ "action": "read", "key": "note" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isSuccess"], true);
        assert_eq!(body["result"], "first draft");
    }

    #[tokio::test]
    async fn test_put_updates_existing_value() {
        let store = Arc::new(CountingStore::default());
        store.put("note", "old").await.unwrap();
        let app = test_app(store.clone());

        let (status, body) = call(&app, put("note", "new")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isSuccess"], true);
        assert_eq!(body["result"], "update action completed");
        assert_eq!(store.get("note").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_identical_put_is_a_noop() {
        let store = Arc::new(CountingStore::default());
        let app = test_app(store.clone());

        let (_, first) = call(&app, put("note", "same")).await;
        assert_eq!(first["result"], "create action completed");

        let (status, second) = call(&app, put("note", "same")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            second,
            json!({
                "status": 200,
                "isSuccess": false,
                "result": "Content is identical to the existing value, no update performed"
            })
        );
        assert_eq!(store.puts(), 1);

        let (_, read) = call(&app, json!({ "action": "read", "key": "note" })).await;
        assert_eq!(read["result"], "same");
    }

    #[tokio::test]
    async fn test_put_requires_key_and_content() {
        let store = Arc::new(CountingStore::default());
        let app = test_app(store.clone());

        for request in [
            json!({ "action": "put" }),
            json!({ "action": "put", "key": "k" }),
            json!({ "action": "put", "content": "v" }),
            json!({ "action": "put", "key": "k", "content": "" }),
        ] {
            let (status, body) = call(&app, request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                body,
                json!({
                    "status": 400,
                    "isSuccess": false,
                    "result": "Key and content are required for put action"
                })
            );
        }
        assert_eq!(store.gets(), 0);
        assert_eq!(store.puts(), 0);
    }
}
