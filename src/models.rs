use std::fmt;
use std::str::FromStr;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::store::ListOptions;

/// Operations the gateway dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, utoipa::ToSchema)]
#[schema(rename_all = "lowercase")]
pub enum Action {
    Read,
    Put,
    Delete,
    List,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Put => "put",
            Action::Delete => "delete",
            Action::List => "list",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Action::Read),
            "put" => Ok(Action::Put),
            "delete" => Ok(Action::Delete),
            "list" => Ok(Action::List),
            _ => Err(()),
        }
    }
}

/// Request body accepted by the gateway
///
/// Fields are read leniently: a field with the wrong JSON type or an empty
/// string is treated as missing, and `limit` only counts when it is a
/// positive integer.
#[derive(Debug, Clone, Default, PartialEq, Eq, utoipa::ToSchema)]
pub struct RequestEnvelope {
    /// `None` when the field is absent or not a known action
    pub action: Option<Action>,
    pub key: Option<String>,
    pub content: Option<String>,
    /// Opaque continuation token from a previous `list`
    pub cursor: Option<String>,
    /// Page size for `list`
    #[schema(minimum = 1)]
    pub limit: Option<u32>,
}

impl RequestEnvelope {
    pub fn from_json(body: &JsonValue) -> Self {
        let text = |field: &str| {
            body.get(field)
                .and_then(JsonValue::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            action: body
                .get("action")
                .and_then(JsonValue::as_str)
                .and_then(|s| s.parse().ok()),
            key: text("key"),
            content: text("content"),
            cursor: text("cursor"),
            limit: body
                .get("limit")
                .and_then(JsonValue::as_u64)
                .filter(|&n| n > 0)
                .map(|n| u32::try_from(n).unwrap_or(u32::MAX)),
        }
    }

    /// Listing options carrying only the fields the caller supplied.
    pub fn list_options(&self) -> ListOptions {
        ListOptions {
            cursor: self.cursor.clone(),
            limit: self.limit.map(|n| n as usize),
        }
    }
}

/// The single response body shape of the gateway
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct GatewayResponse {
    pub status: u16,
    #[serde(rename = "isSuccess")]
    pub is_success: bool,
    /// A message, a stored value, or a list result
    #[schema(value_type = Object)]
    pub result: JsonValue,
}

impl GatewayResponse {
    pub fn new(status: StatusCode, is_success: bool, result: impl Into<JsonValue>) -> Self {
        Self {
            status: status.as_u16(),
            is_success,
            result: result.into(),
        }
    }

    pub fn success(result: impl Into<JsonValue>) -> Self {
        Self::new(StatusCode::OK, true, result)
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, false, message.into())
    }
}

impl IntoResponse for GatewayResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// `result` of a successful `list`
#[derive(Debug, Clone, PartialEq, utoipa::ToSchema)]
pub struct ListResult {
    pub keys: Vec<String>,
    /// `null` once the listing is exhausted
    pub cursor: Option<String>,
}

impl From<ListResult> for JsonValue {
    fn from(result: ListResult) -> Self {
        serde_json::json!({
            "keys": result.keys,
            "cursor": result.cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_parsing_is_exact() {
        assert_eq!("read".parse::<Action>(), Ok(Action::Read));
        assert_eq!("list".parse::<Action>(), Ok(Action::List));
        assert!("Read".parse::<Action>().is_err());
        assert!("wipe".parse::<Action>().is_err());
        assert!("".parse::<Action>().is_err());
    }

    #[test]
    fn test_envelope_reads_all_fields() {
        let envelope = RequestEnvelope::from_json(&json!({
            "action": "list",
            "key": "k",
            "content": "foo",
            "cursor": "abc",
            "limit": 10
        }));

        assert_eq!(
            envelope,
            RequestEnvelope {
                action: Some(Action::List),
                key: Some("k".to_string()),
                content: Some("foo".to_string()),
                cursor: Some("abc".to_string()),
                limit: Some(10),
            }
        );
    }

    #[test]
    fn test_envelope_treats_falsy_and_mistyped_fields_as_missing() {
        let envelope = RequestEnvelope::from_json(&json!({
            "action": 3,
            "key": "",
            "content": 42,
            "cursor": null,
            "limit": 0
        }));
        assert_eq!(envelope, RequestEnvelope::default());

        let negative = RequestEnvelope::from_json(&json!({ "limit": -5 }));
        assert_eq!(negative.limit, None);
    }

    #[test]
    fn test_non_object_body_has_no_action() {
        assert_eq!(RequestEnvelope::from_json(&json!([1, 2])).action, None);
        assert_eq!(RequestEnvelope::from_json(&json!("read")).action, None);
    }

    #[test]
    fn test_list_options_only_forward_supplied_fields() {
        let envelope = RequestEnvelope::from_json(&json!({ "action": "list" }));
        assert_eq!(envelope.list_options(), ListOptions::default());

        let envelope = RequestEnvelope::from_json(&json!({ "action": "list", "cursor": "c", "limit": 5 }));
        assert_eq!(
            envelope.list_options(),
            ListOptions { cursor: Some("c".to_string()), limit: Some(5) }
        );
    }

    #[test]
    fn test_response_serializes_with_is_success_field() {
        let body = serde_json::to_value(GatewayResponse::success("Value deleted")).unwrap();
        assert_eq!(body, json!({ "status": 200, "isSuccess": true, "result": "Value deleted" }));
    }

    #[test]
    fn test_list_result_serializes_null_cursor() {
        let value: JsonValue = ListResult { keys: vec!["a".to_string()], cursor: None }.into();
        assert_eq!(value, json!({ "keys": ["a"], "cursor": null }));
    }
}
