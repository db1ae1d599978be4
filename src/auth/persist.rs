/// Token pair persistence
///
/// Writes a freshly issued pair onto the user record. Store failures are
/// returned to the caller, never dropped.

use chrono::Utc;

use crate::auth::TokenPair;
use crate::error::StoreError;
use crate::models::StoredTokens;
use crate::store::UserStore;

/// Upsert `pair` and a fresh `updated_at` onto the record keyed by `user_id`.
pub async fn persist_token_pair(
    store: &dyn UserStore,
    user_id: &str,
    pair: &TokenPair,
) -> Result<(), StoreError> {
    let tokens = StoredTokens::new(pair, Utc::now());

    store.upsert_tokens(user_id, &tokens).await.map_err(|e| {
        tracing::error!(user_id = %user_id, error = %e, "Failed to persist token pair");
        e
    })?;

    tracing::debug!(user_id = %user_id, "Token pair persisted");
    Ok(())
}
