use std::fmt;

/// Opaque bearer token issued by the authentication service
#[derive(Clone, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct AuthToken(pub String);

impl AuthToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens end up in logs through `?` formatting, keep them out
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

/// Body of `POST /api/user/token/refresh/`
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct TokenRefresh {
    pub refresh: AuthToken,
}

/// Answer to a successful token refresh
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct RefreshedToken {
    pub access: AuthToken,
}
