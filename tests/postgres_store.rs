//! Postgres store tests. They need a running Postgres reachable with the
//! settings in `configuration.yaml`; run with `cargo test -- --ignored`.

use authkeeper::auth::Role;
use authkeeper::configuration::{get_configuration, DatabaseSettings};
use authkeeper::error::StoreError;
use authkeeper::models::{StoredTokens, User};
use authkeeper::store::{PgUserStore, UserStore};
use chrono::Utc;
use secrecy::ExposeSecret;
use sqlx::{Connection, Executor, PgConnection, PgPool};

async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection =
        PgConnection::connect(config.connection_string_without_db().expose_secret())
            .await
            .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");

    PgPool::connect(config.connection_string().expose_secret())
        .await
        .expect("Failed to connect to Postgres.")
}

async fn spawn_store() -> PgUserStore {
    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();
    let pool = configure_database(&configuration.database).await;

    let store = PgUserStore::new(pool);
    store.migrate().await.expect("Failed to migrate the database.");
    store
}

fn user(n: usize) -> User {
    let now = Utc::now();
    User {
        user_id: uuid::Uuid::new_v4().to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: format!("user{}@x.com", n),
        phone: format!("+155500000{:02}", n),
        role: Role::User,
        password_hash: "$2b$04$hash".to_string(),
        token: None,
        refresh_token: None,
        created_at: now,
        updated_at: now,
    }
}

fn tokens(tag: &str) -> StoredTokens {
    StoredTokens {
        token: format!("access-{}", tag),
        refresh_token: format!("refresh-{}", tag),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn upsert_tokens_last_writer_wins() {
    let store = spawn_store().await;
    let created = user(1);
    store.insert_user(&created).await.unwrap();

    store.upsert_tokens(&created.user_id, &tokens("old")).await.unwrap();
    store.upsert_tokens(&created.user_id, &tokens("new")).await.unwrap();

    let found = store
        .find_by_user_id(&created.user_id)
        .await
        .unwrap()
        .expect("user not found");
    assert_eq!(found.token.as_deref(), Some("access-new"));
    assert_eq!(found.refresh_token.as_deref(), Some("refresh-new"));
    assert_eq!(found.email, created.email);
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn upsert_tokens_without_user_row_succeeds() {
    let store = spawn_store().await;

    store.upsert_tokens("no-such-user", &tokens("a")).await.unwrap();

    assert!(store.find_by_user_id("no-such-user").await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn user_without_tokens_reads_back_empty_token_fields() {
    let store = spawn_store().await;
    let created = user(1);
    store.insert_user(&created).await.unwrap();

    let found = store.find_by_email(&created.email).await.unwrap().unwrap();

    assert_eq!(found.user_id, created.user_id);
    assert!(found.token.is_none());
    assert!(found.refresh_token.is_none());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn duplicate_email_is_reported_as_duplicate() {
    let store = spawn_store().await;
    store.insert_user(&user(1)).await.unwrap();

    let mut clash = user(2);
    clash.email = "user1@x.com".to_string();

    assert!(matches!(
        store.insert_user(&clash).await,
        Err(StoreError::Duplicate(_))
    ));
    assert!(store.email_exists("user1@x.com").await.unwrap());
    assert!(!store.phone_exists("+15550000002").await.unwrap());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn list_users_pages_in_insertion_order() {
    let store = spawn_store().await;
    for n in 1..=25 {
        store.insert_user(&user(n)).await.unwrap();
    }

    let page = store.list_users(10, 10).await.unwrap();

    assert_eq!(page.total_count, 25);
    let emails: Vec<String> = page.user_items.into_iter().map(|u| u.email).collect();
    let expected: Vec<String> = (11..=20).map(|n| format!("user{}@x.com", n)).collect();
    assert_eq!(emails, expected);

    let tail = store.list_users(20, 10).await.unwrap();
    assert_eq!(tail.user_items.len(), 5);
}
