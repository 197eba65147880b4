//! PostgreSQL store tests.
//!
//! These run against the database named by `QUILL_TEST_DATABASE_URL` and are
//! skipped when it is unset. Every test works on freshly created users, so
//! they can share one database and run in parallel.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use quill_auth::store::{PgRefreshTokenStore, PgUserStore};
use quill_auth::{RefreshTokenStore, UserStore};
use quill_core::config::DatabaseConfig;
use quill_core::{ErrorKind, UserId};
use quill_database::DatabasePool;
use quill_database::repositories::{RefreshTokenRepository, UserRepository};
use quill_entity::user::{CreateUser, User};

const DATABASE_URL_VAR: &str = "QUILL_TEST_DATABASE_URL";

struct PgStores {
    users: PgUserStore,
    tokens: PgRefreshTokenStore,
}

/// Connect and migrate, or `None` when no test database is configured.
async fn pg_stores() -> Option<PgStores> {
    let Ok(url) = std::env::var(DATABASE_URL_VAR) else {
        eprintln!("{DATABASE_URL_VAR} not set, skipping PostgreSQL store test");
        return None;
    };

    let config = DatabaseConfig {
        url,
        max_connections: 4,
        min_connections: 0,
        ..DatabaseConfig::default()
    };
    let pool = DatabasePool::connect(&config)
        .await
        .expect("Failed to connect to test database");
    quill_database::migration::run_migrations(pool.pool())
        .await
        .expect("Failed to run migrations");

    Some(PgStores {
        users: PgUserStore::new(Arc::new(UserRepository::new(pool.pool().clone()))),
        tokens: PgRefreshTokenStore::new(Arc::new(RefreshTokenRepository::new(
            pool.pool().clone(),
        ))),
    })
}

/// A user with a name no other test run will pick.
async fn fresh_user(stores: &PgStores) -> User {
    let tag = UserId::new().to_string().replace('-', "");
    stores
        .users
        .create(CreateUser {
            username: format!("u{}", &tag[..16]),
            name: "Store Test".to_string(),
            email: format!("{tag}@example.com"),
            password_hash: "hash".to_string(),
        })
        .await
        .expect("Failed to create user")
}

fn in_an_hour() -> DateTime<Utc> {
    Utc::now() + Duration::hours(1)
}

#[tokio::test]
async fn test_put_twice_keeps_only_the_latest_token() {
    let Some(stores) = pg_stores().await else {
        return;
    };
    let user = fresh_user(&stores).await;

    stores.tokens.put(user.id, "first", in_an_hour()).await.unwrap();
    stores.tokens.put(user.id, "second", in_an_hour()).await.unwrap();

    assert!(
        stores
            .tokens
            .find_current(user.id, "first")
            .await
            .unwrap()
            .is_none()
    );
    let record = stores
        .tokens
        .find_current(user.id, "second")
        .await
        .unwrap()
        .expect("Latest token should be on file");
    assert_eq!(record.user_id, user.id);
    assert_ne!(record.token_hash, "second");
}

#[tokio::test]
async fn test_rotate_is_conditional_on_the_current_token() {
    let Some(stores) = pg_stores().await else {
        return;
    };
    let user = fresh_user(&stores).await;
    stores.tokens.put(user.id, "t1", in_an_hour()).await.unwrap();

    assert!(
        stores
            .tokens
            .rotate(user.id, "t1", "t2", in_an_hour())
            .await
            .unwrap()
    );
    assert!(
        !stores
            .tokens
            .rotate(user.id, "t1", "t3", in_an_hour())
            .await
            .unwrap()
    );
    assert!(
        stores
            .tokens
            .find_current(user.id, "t2")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_delete_by_token() {
    let Some(stores) = pg_stores().await else {
        return;
    };
    let user = fresh_user(&stores).await;
    stores.tokens.put(user.id, "doomed", in_an_hour()).await.unwrap();

    stores.tokens.delete_by_token("never-issued").await.unwrap();
    assert!(
        stores
            .tokens
            .find_current(user.id, "doomed")
            .await
            .unwrap()
            .is_some()
    );

    stores.tokens.delete_by_token("doomed").await.unwrap();
    assert!(
        stores
            .tokens
            .find_current(user.id, "doomed")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_purge_expired_keeps_live_records() {
    let Some(stores) = pg_stores().await else {
        return;
    };
    let stale = fresh_user(&stores).await;
    let live = fresh_user(&stores).await;
    stores
        .tokens
        .put(stale.id, "old", Utc::now() - Duration::minutes(5))
        .await
        .unwrap();
    stores.tokens.put(live.id, "new", in_an_hour()).await.unwrap();

    // Other tests may leave expired rows too, so only a lower bound holds.
    let removed = stores.tokens.purge_expired(Utc::now()).await.unwrap();
    assert!(removed >= 1);

    assert!(
        stores
            .tokens
            .find_current(stale.id, "old")
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        stores
            .tokens
            .find_current(live.id, "new")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_duplicate_user_is_a_conflict() {
    let Some(stores) = pg_stores().await else {
        return;
    };
    let user = fresh_user(&stores).await;

    let same_name = stores
        .users
        .create(CreateUser {
            username: user.username.to_uppercase(),
            name: "Copy".to_string(),
            email: format!("copy-{}", user.email),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(same_name.kind, ErrorKind::Conflict);

    let same_email = stores
        .users
        .create(CreateUser {
            username: format!("{}x", user.username),
            name: "Copy".to_string(),
            email: user.email.to_uppercase(),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(same_email.kind, ErrorKind::Conflict);

    let found = stores
        .users
        .find_by_username(&user.username.to_uppercase())
        .await
        .unwrap()
        .expect("Lookup should ignore case");
    assert_eq!(found.id, user.id);
    assert!(stores.users.email_taken(&user.email).await.unwrap());
}
