/// Signup and login orchestration.
///
/// Ties the password hasher, the token issuer and the user store together.
/// bcrypt work runs on the blocking pool so a slow hash never stalls the
/// request workers.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{persist_token_pair, PasswordHasher, TokenIssuer};
use crate::error::{AppError, AuthError, StoreError};
use crate::models::{LoginRequest, SignupRequest, User};
use crate::store::UserStore;
use crate::validators::{is_valid_email, is_valid_name, is_valid_password, is_valid_phone};

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    issuer: Arc<TokenIssuer>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, issuer: Arc<TokenIssuer>, hasher: PasswordHasher) -> Self {
        Self {
            store,
            issuer,
            hasher,
        }
    }

    /// Create a user and its first token pair.
    ///
    /// # Errors
    /// - `Validation` for malformed fields
    /// - `Conflict` when the email or phone is already registered
    /// - `Store` when the store fails or times out
    pub async fn signup(&self, request: SignupRequest) -> Result<User, AppError> {
        let first_name = is_valid_name("first_name", &request.first_name)?;
        let last_name = is_valid_name("last_name", &request.last_name)?;
        let email = is_valid_email(&request.email)?;
        let phone = is_valid_phone(&request.phone)?;
        is_valid_password(&request.password)?;

        if self.store.email_exists(&email).await? {
            return Err(AppError::Conflict("this email already exists".to_string()));
        }
        if self.store.phone_exists(&phone).await? {
            return Err(AppError::Conflict("this phone number already exists".to_string()));
        }

        let password_hash = {
            let hasher = self.hasher.clone();
            let password = request.password;
            run_blocking(move || hasher.hash(&password)).await??
        };

        let now = Utc::now();
        let mut user = User {
            user_id: Uuid::new_v4().to_string(),
            first_name,
            last_name,
            email,
            phone,
            role: request.role,
            password_hash,
            token: None,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };

        let pair = self.issuer.issue(&user.identity())?;
        user.token = Some(pair.access_token);
        user.refresh_token = Some(pair.refresh_token);

        // A concurrent signup can still win the race past the checks above
        self.store.insert_user(&user).await.map_err(|e| match e {
            StoreError::Duplicate(field) => {
                AppError::Conflict(format!("this {} already exists", field))
            }
            other => AppError::Store(other),
        })?;

        tracing::info!(user_id = %user.user_id, role = %user.role, "User signed up");
        Ok(user)
    }

    /// Verify credentials, issue a fresh pair and return the updated record.
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, request: LoginRequest) -> Result<User, AppError> {
        let email = is_valid_email(&request.email)?;
        let found = self.store.find_by_email(&email).await?;

        let hasher = self.hasher.clone();
        let password = request.password;
        let (found, verified) = run_blocking(move || match found {
            Some(user) => {
                let verified = hasher.verify(&user.password_hash, &password);
                (Some(user), verified)
            }
            None => (None, hasher.verify_dummy(&password)),
        })
        .await?;

        let user = match found {
            Some(user) if verified => user,
            _ => return Err(AuthError::InvalidCredentials.into()),
        };

        let pair = self.issuer.issue(&user.identity())?;
        persist_token_pair(self.store.as_ref(), &user.user_id, &pair).await?;

        let refreshed = self
            .store
            .find_by_user_id(&user.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("user".to_string()))?;

        tracing::info!(user_id = %refreshed.user_id, "User logged in");
        Ok(refreshed)
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))
}
