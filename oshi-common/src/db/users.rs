//! Account queries
//!
//! Removing a user removes their quotes and sessions through the foreign-key
//! cascade declared in [`crate::db::init`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::auth::{hash_password, verify_password};
use crate::db::models::User;
use crate::{Error, Result};

/// Create an account with an Argon2id password hash
pub async fn create_user(pool: &SqlitePool, username: &str, password: &str) -> Result<User> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::InvalidInput("username must not be empty".to_string()));
    }
    if password.is_empty() {
        return Err(Error::InvalidInput("password must not be empty".to_string()));
    }

    let hash = hash_password(password)?;

    let result = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, password_hash, created_at)
        VALUES (?, ?, ?)
        RETURNING id, username, password_hash, created_at
        "#,
    )
    .bind(username)
    .bind(&hash)
    .bind(Utc::now())
    .fetch_one(pool)
    .await;

    match result {
        Ok(user) => {
            info!("Created user {} (id {})", user.username, user.id);
            Ok(user)
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(Error::DuplicateUser(username.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn find_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Look up a user and check the password; `None` for unknown user or wrong password
pub async fn authenticate(pool: &SqlitePool, username: &str, password: &str) -> Result<Option<User>> {
    let Some(user) = find_user_by_username(pool, username.trim()).await? else {
        return Ok(None);
    };

    if verify_password(password, &user.password_hash) {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

/// Delete an account, returning how many quotes went with it
pub async fn delete_user(pool: &SqlitePool, username: &str) -> Result<u64> {
    let mut tx = pool.begin().await?;

    let user_id: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(user_id) = user_id else {
        return Err(Error::NotFound(format!("user {}", username)));
    };

    let quote_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes WHERE owner_id = ?")
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        "Deleted user {} (id {}) and {} quote(s)",
        username, user_id, quote_count
    );

    Ok(quote_count as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_memory_database;

    #[tokio::test]
    async fn test_create_and_authenticate() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, "user_a", "password123").await.unwrap();

        assert_eq!(user.username, "user_a");
        assert_ne!(user.password_hash, "password123");
        assert!(user.password_hash.starts_with("$argon2id$"));

        let ok = authenticate(&pool, "user_a", "password123").await.unwrap();
        assert_eq!(ok.map(|u| u.id), Some(user.id));

        let wrong = authenticate(&pool, "user_a", "nope").await.unwrap();
        assert!(wrong.is_none());

        let unknown = authenticate(&pool, "nobody", "password123").await.unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let pool = init_memory_database().await.unwrap();
        create_user(&pool, "user_a", "pw").await.unwrap();

        let err = create_user(&pool, "user_a", "other").await.unwrap_err();
        assert!(matches!(err, Error::DuplicateUser(name) if name == "user_a"));
    }

    #[tokio::test]
    async fn test_empty_credentials_rejected() {
        let pool = init_memory_database().await.unwrap();

        assert!(matches!(
            create_user(&pool, "  ", "pw").await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            create_user(&pool, "user", "").await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_unknown_user() {
        let pool = init_memory_database().await.unwrap();
        let err = delete_user(&pool, "ghost").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
