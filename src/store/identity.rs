//! Caller identification.

use std::fmt;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

/// The identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub is_admin: bool,
}

/// Resolves the caller of a request, if any.
pub trait IdentityProvider: Send + Sync + fmt::Debug {
    /// Current caller, or `None` for anonymous requests.
    fn identify(&self, headers: &HeaderMap) -> Option<Caller>;

    /// Whether the caller is an administrator.
    fn is_admin(&self, headers: &HeaderMap) -> bool {
        self.identify(headers).is_some_and(|caller| caller.is_admin)
    }
}

/// Recognises a single administrator by a shared bearer token.
///
/// With no token configured every request is anonymous.
#[derive(Clone, Default)]
pub struct TokenIdentity {
    admin_token: Option<String>,
}

impl TokenIdentity {
    pub fn new(admin_token: Option<String>) -> Self {
        Self {
            admin_token: admin_token.filter(|token| !token.is_empty()),
        }
    }
}

impl fmt::Debug for TokenIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIdentity")
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl IdentityProvider for TokenIdentity {
    fn identify(&self, headers: &HeaderMap) -> Option<Caller> {
        let expected = self.admin_token.as_deref()?;
        let presented = headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?
            .trim();

        (presented == expected).then(|| Caller {
            user_id: "admin".to_string(),
            is_admin: true,
        })
    }
}
