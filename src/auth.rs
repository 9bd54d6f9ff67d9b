use axum::http::HeaderMap;

/// Header carrying the shared secret
pub const AUTH_HEADER: &str = "jerry-auth";

/// Decides whether a request may reach the store.
pub trait Authenticator: Send + Sync {
    /// `presented` is the raw `jerry-auth` value, or `None` when the header
    /// is missing or not valid UTF-8.
    fn authenticate(&self, presented: Option<&str>) -> bool;
}

/// Plain equality check against a secret fixed at startup.
///
/// The comparison is not constant-time.
#[derive(Clone)]
pub struct SharedSecretAuthenticator {
    secret: String,
}

impl SharedSecretAuthenticator {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl Authenticator for SharedSecretAuthenticator {
    fn authenticate(&self, presented: Option<&str>) -> bool {
        matches!(presented, Some(value) if !value.is_empty() && value == self.secret)
    }
}

/// Extract the `jerry-auth` header value from a request.
pub fn presented_secret(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTH_HEADER).and_then(|value| value.to_str().ok())
}
