//! Authentication provider trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::UserId;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Member,
    Admin,
}

/// The authenticated caller, threaded explicitly into every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn member(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Member,
        }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Resolves a bearer token to a stable user identity.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the principal for `token`, or None if it is not recognised.
    async fn current_user(&self, token: &str) -> Option<Principal>;
}

/// Token table for tests and the standalone server.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuthProvider {
    tokens: Arc<RwLock<HashMap<String, Principal>>>,
}

impl InMemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token` for `principal`, replacing any earlier owner.
    pub async fn register(&self, token: impl Into<String>, principal: Principal) {
        self.tokens.write().await.insert(token.into(), principal);
    }

    /// Creates a fresh user and returns a token for them.
    pub async fn issue(&self, role: Role) -> (String, Principal) {
        let principal = Principal {
            user_id: UserId::new(),
            role,
        };
        let token = uuid::Uuid::new_v4().simple().to_string();
        self.register(token.clone(), principal).await;
        (token, principal)
    }

    pub async fn revoke(&self, token: &str) {
        self.tokens.write().await.remove(token);
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn current_user(&self, token: &str) -> Option<Principal> {
        self.tokens.read().await.get(token).copied()
    }
}
