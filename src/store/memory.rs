/// In-memory user store for tests and local development.
///
/// Users are kept in insertion order. Token fields live in their own map,
/// mirroring the `user_tokens` table of the Postgres store, so a token
/// upsert for an unknown user creates the linkage without a user row.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::UserStore;
use crate::error::StoreError;
use crate::models::{StoredTokens, User, UserPage};

#[derive(Default)]
struct State {
    users: Vec<User>,
    tokens: HashMap<String, StoredTokens>,
}

impl State {
    fn with_tokens(&self, user: &User) -> User {
        let mut user = user.clone();
        if let Some(tokens) = self.tokens.get(&user.user_id) {
            user.token = Some(tokens.token.clone());
            user.refresh_token = Some(tokens.refresh_token.clone());
            user.updated_at = tokens.updated_at;
        }
        user
    }
}

#[derive(Default)]
pub struct InMemoryUserStore {
    state: RwLock<State>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Token fields stored for `user_id`, whether or not a user row exists.
    pub async fn tokens_for(&self, user_id: &str) -> Option<StoredTokens> {
        self.state.read().await.tokens.get(user_id).cloned()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.state.read().await.users.iter().any(|u| u.email == email))
    }

    async fn phone_exists(&self, phone: &str) -> Result<bool, StoreError> {
        Ok(self.state.read().await.users.iter().any(|u| u.phone == phone))
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        // Same unique constraints as the users table
        if let Some(existing) = state.users.iter().find(|u| {
            u.user_id == user.user_id || u.email == user.email || u.phone == user.phone
        }) {
            let field = if existing.user_id == user.user_id {
                "user_id"
            } else if existing.email == user.email {
                "email"
            } else {
                "phone"
            };
            return Err(StoreError::Duplicate(field.to_string()));
        }

        if let (Some(token), Some(refresh_token)) = (&user.token, &user.refresh_token) {
            state.tokens.insert(
                user.user_id.clone(),
                StoredTokens {
                    token: token.clone(),
                    refresh_token: refresh_token.clone(),
                    updated_at: user.updated_at,
                },
            );
        }
        state.users.push(user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| state.with_tokens(u)))
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.user_id == user_id)
            .map(|u| state.with_tokens(u)))
    }

    async fn upsert_tokens(&self, user_id: &str, tokens: &StoredTokens) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .tokens
            .insert(user_id.to_string(), tokens.clone());
        Ok(())
    }

    async fn list_users(&self, offset: usize, limit: usize) -> Result<UserPage, StoreError> {
        let state = self.state.read().await;
        let user_items = state
            .users
            .iter()
            .skip(offset)
            .take(limit)
            .map(|u| state.with_tokens(u))
            .collect();

        Ok(UserPage {
            total_count: state.users.len() as u64,
            user_items,
        })
    }
}
