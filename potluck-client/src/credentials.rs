use parking_lot::RwLock;

use crate::api::AuthToken;

/// Where the session tokens of the current user live
pub trait CredentialStore: Send + Sync {
    fn access_token(&self) -> Option<AuthToken>;
    fn refresh_token(&self) -> Option<AuthToken>;
    fn set_access_token(&self, token: Option<AuthToken>);
}

#[derive(Debug, Default)]
pub struct MemoryCredentials {
    access: RwLock<Option<AuthToken>>,
    refresh: RwLock<Option<AuthToken>>,
}

impl MemoryCredentials {
    pub fn new(access: Option<AuthToken>, refresh: Option<AuthToken>) -> MemoryCredentials {
        MemoryCredentials {
            access: RwLock::new(access),
            refresh: RwLock::new(refresh),
        }
    }

    pub fn anonymous() -> MemoryCredentials {
        MemoryCredentials::default()
    }

    pub fn logout(&self) {
        *self.access.write() = None;
        *self.refresh.write() = None;
    }
}

impl CredentialStore for MemoryCredentials {
    fn access_token(&self) -> Option<AuthToken> {
        self.access.read().clone()
    }

    fn refresh_token(&self) -> Option<AuthToken> {
        self.refresh.read().clone()
    }

    fn set_access_token(&self, token: Option<AuthToken>) {
        *self.access.write() = token;
    }
}
