//! Server-side login sessions
//!
//! A session row maps a random token (sent to the browser as a cookie) to a
//! user id until `expires_at`. Expired rows are treated as absent and deleted
//! when encountered.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::auth::generate_session_token;
use crate::db::models::{Session, User};
use crate::{Error, Result};

/// Start a session for `user_id` lasting `ttl`
pub async fn create_session(pool: &SqlitePool, user_id: i64, ttl: Duration) -> Result<Session> {
    let now = Utc::now();
    let expires = now
        .checked_add_signed(ttl)
        .ok_or_else(|| Error::InvalidInput(format!("session lifetime {} out of range", ttl)))?;

    let session = Session {
        token: generate_session_token(),
        user_id,
        created_at: now,
        expires_at: expires.timestamp(),
    };

    sqlx::query("INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&session.token)
        .bind(session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(pool)
        .await?;

    debug!("Created session for user {}", user_id);

    Ok(session)
}

/// Resolve a session token to its user, if the session is still live
pub async fn find_session_user(pool: &SqlitePool, token: &str) -> Result<Option<User>> {
    let session = sqlx::query_as::<_, Session>(
        "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    let Some(session) = session else {
        return Ok(None);
    };

    if session.is_expired_at(Utc::now()) {
        debug!("Session for user {} expired", session.user_id);
        delete_session(pool, token).await?;
        return Ok(None);
    }

    crate::db::users::get_user(pool, session.user_id).await
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Remove every expired session, returning the number removed
pub async fn purge_expired_sessions(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(Utc::now().timestamp())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_memory_database;
    use crate::db::users::{create_user, delete_user};

    #[tokio::test]
    async fn test_session_lookup() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, "user_a", "pw").await.unwrap();

        let session = create_session(&pool, user.id, Duration::hours(1)).await.unwrap();
        let found = find_session_user(&pool, &session.token).await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));

        assert!(find_session_user(&pool, "bogus").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_ignored_and_removed() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, "user_a", "pw").await.unwrap();

        let session = create_session(&pool, user.id, Duration::seconds(-10)).await.unwrap();
        assert!(find_session_user(&pool, &session.token).await.unwrap().is_none());

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_purge_expired_sessions() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, "user_a", "pw").await.unwrap();

        create_session(&pool, user.id, Duration::seconds(-1)).await.unwrap();
        create_session(&pool, user.id, Duration::seconds(-1)).await.unwrap();
        let live = create_session(&pool, user.id, Duration::hours(1)).await.unwrap();

        assert_eq!(purge_expired_sessions(&pool).await.unwrap(), 2);
        assert!(find_session_user(&pool, &live.token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_out_of_range_lifetime_rejected() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, "user_a", "pw").await.unwrap();

        // About a million years, past the largest representable timestamp
        let err = create_session(&pool, user.id, Duration::days(365_000_000))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored, 0);
    }

    #[tokio::test]
    async fn test_sessions_removed_with_user() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, "user_a", "pw").await.unwrap();
        let session = create_session(&pool, user.id, Duration::hours(1)).await.unwrap();

        delete_user(&pool, "user_a").await.unwrap();

        assert!(find_session_user(&pool, &session.token).await.unwrap().is_none());
    }
}
