/// Postgres-backed user store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::UserStore;
use crate::auth::Role;
use crate::error::StoreError;
use crate::models::{StoredTokens, User, UserPage};

const SELECT_USER: &str = r#"
    SELECT u.user_id, u.first_name, u.last_name, u.email, u.phone, u.role,
           u.password_hash, t.token, t.refresh_token, u.created_at,
           COALESCE(t.updated_at, u.updated_at) AS updated_at
    FROM users u
    LEFT JOIN user_tokens t ON t.user_id = u.user_id
"#;

const UPSERT_TOKENS: &str = r#"
    INSERT INTO user_tokens (user_id, token, refresh_token, updated_at)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (user_id) DO UPDATE
    SET token = EXCLUDED.token,
        refresh_token = EXCLUDED.refresh_token,
        updated_at = EXCLUDED.updated_at
"#;

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    role: String,
    password_hash: String,
    token: Option<String>,
    refresh_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<Role>().map_err(|_| {
            StoreError::Query(format!("user {} has unknown role {:?}", row.user_id, row.role))
        })?;

        Ok(User {
            user_id: row.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            role,
            password_hash: row.password_hash,
            token: row.token,
            refresh_token: row.refresh_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the schema in `migrations/`.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Query(format!("migration failed: {}", e)))
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, StoreError> {
        let query = format!("{} WHERE u.{} = $1", SELECT_USER, column);
        sqlx::query_as::<_, UserRow>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn exists(&self, column: &str, value: &str) -> Result<bool, StoreError> {
        let query = format!("SELECT EXISTS(SELECT 1 FROM users WHERE {} = $1)", column);
        let exists = sqlx::query_scalar::<_, bool>(&query)
            .bind(value)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        self.exists("email", email).await
    }

    async fn phone_exists(&self, phone: &str) -> Result<bool, StoreError> {
        self.exists("phone", phone).await
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (user_id, first_name, last_name, email, phone, role,
                               password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut tx)
        .await?;

        if let (Some(token), Some(refresh_token)) = (&user.token, &user.refresh_token) {
            sqlx::query(UPSERT_TOKENS)
                .bind(&user.user_id)
                .bind(token)
                .bind(refresh_token)
                .bind(user.updated_at)
                .execute(&mut tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_one("email", email).await
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        self.find_one("user_id", user_id).await
    }

    async fn upsert_tokens(&self, user_id: &str, tokens: &StoredTokens) -> Result<(), StoreError> {
        sqlx::query(UPSERT_TOKENS)
            .bind(user_id)
            .bind(&tokens.token)
            .bind(&tokens.refresh_token)
            .bind(tokens.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_users(&self, offset: usize, limit: usize) -> Result<UserPage, StoreError> {
        let total_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let query = format!("{} ORDER BY u.id LIMIT $1 OFFSET $2", SELECT_USER);
        let user_items = sqlx::query_as::<_, UserRow>(&query)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(UserPage {
            total_count: total_count.max(0) as u64,
            user_items,
        })
    }
}
