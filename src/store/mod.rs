/// User store
///
/// The core only talks to the store through `UserStore`. Every call a
/// request makes goes through `BoundedStore`, so a slow or unreachable store
/// fails the request instead of holding a worker.

mod memory;
mod postgres;

pub use memory::InMemoryUserStore;
pub use postgres::PgUserStore;

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::StoreError;
use crate::models::{StoredTokens, User, UserPage};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;

    async fn phone_exists(&self, phone: &str) -> Result<bool, StoreError>;

    /// Insert a new user, including any token fields it already carries.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    /// Set the token fields for `user_id`, creating them if absent.
    /// Last writer wins.
    async fn upsert_tokens(&self, user_id: &str, tokens: &StoredTokens) -> Result<(), StoreError>;

    /// Users in insertion order, skipping `offset` and returning at most `limit`.
    async fn list_users(&self, offset: usize, limit: usize) -> Result<UserPage, StoreError>;
}

/// Bounds every call on the wrapped store with a timeout
#[derive(Clone)]
pub struct BoundedStore {
    inner: Arc<dyn UserStore>,
    limit: Duration,
}

impl BoundedStore {
    pub fn new(inner: Arc<dyn UserStore>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T, F>(&self, operation: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>> + Send,
    {
        tokio::time::timeout(self.limit, operation)
            .await
            .map_err(|_| StoreError::Timeout(self.limit))?
    }
}

#[async_trait]
impl UserStore for BoundedStore {
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        self.bounded(self.inner.email_exists(email)).await
    }

    async fn phone_exists(&self, phone: &str) -> Result<bool, StoreError> {
        self.bounded(self.inner.phone_exists(phone)).await
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        self.bounded(self.inner.insert_user(user)).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.bounded(self.inner.find_by_email(email)).await
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        self.bounded(self.inner.find_by_user_id(user_id)).await
    }

    async fn upsert_tokens(&self, user_id: &str, tokens: &StoredTokens) -> Result<(), StoreError> {
        self.bounded(self.inner.upsert_tokens(user_id, tokens)).await
    }

    async fn list_users(&self, offset: usize, limit: usize) -> Result<UserPage, StoreError> {
        self.bounded(self.inner.list_users(offset, limit)).await
    }
}
