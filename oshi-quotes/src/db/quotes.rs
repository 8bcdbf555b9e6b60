//! Quote queries
//!
//! Mutating statements carry `owner_id` in their WHERE clause as well, so a
//! row can only change when the caller's user id matches the stored owner.

use chrono::Utc;
use oshi_common::db::Quote;
use oshi_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::forms::QuoteInput;

/// Quote joined with its owner's username, for the list page
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct QuoteListing {
    #[sqlx(flatten)]
    pub quote: Quote,
    pub owner_username: String,
}

/// All quotes in storage order (ascending id)
pub async fn list_quotes(pool: &SqlitePool) -> Result<Vec<QuoteListing>> {
    let rows = sqlx::query_as::<_, QuoteListing>(
        r#"
        SELECT q.id, q.owner_id, q.text, q.artist, q.song_title, q.created_at,
               u.username AS owner_username
        FROM quotes q
        JOIN users u ON u.id = q.owner_id
        ORDER BY q.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn get_quote(pool: &SqlitePool, id: i64) -> Result<Option<Quote>> {
    let quote = sqlx::query_as::<_, Quote>(
        "SELECT id, owner_id, text, artist, song_title, created_at FROM quotes WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(quote)
}

/// Insert a quote owned by `owner_id`
pub async fn insert_quote(pool: &SqlitePool, owner_id: i64, input: &QuoteInput) -> Result<Quote> {
    let quote = sqlx::query_as::<_, Quote>(
        r#"
        INSERT INTO quotes (owner_id, text, artist, song_title, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, owner_id, text, artist, song_title, created_at
        "#,
    )
    .bind(owner_id)
    .bind(&input.text)
    .bind(&input.artist)
    .bind(&input.song_title)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(quote)
}

/// Update the content fields of a quote owned by `owner_id`
///
/// Returns `false` when no such quote exists for that owner.
pub async fn update_owned_quote(
    pool: &SqlitePool,
    id: i64,
    owner_id: i64,
    input: &QuoteInput,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE quotes SET text = ?, artist = ?, song_title = ? WHERE id = ? AND owner_id = ?",
    )
    .bind(&input.text)
    .bind(&input.artist)
    .bind(&input.song_title)
    .bind(id)
    .bind(owner_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Hard-delete a quote owned by `owner_id`
///
/// Returns `false` when no such quote exists for that owner.
pub async fn delete_owned_quote(pool: &SqlitePool, id: i64, owner_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM quotes WHERE id = ? AND owner_id = ?")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oshi_common::db::init::init_memory_database;
    use oshi_common::db::users::create_user;

    fn input(text: &str) -> QuoteInput {
        QuoteInput {
            text: text.to_string(),
            artist: "歌手A".to_string(),
            song_title: "曲A".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_in_storage_order() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, "user_a", "pw").await.unwrap();

        let first = insert_quote(&pool, user.id, &input("一つ目")).await.unwrap();
        let second = insert_quote(&pool, user.id, &input("二つ目")).await.unwrap();
        assert!(second.id > first.id);

        let listings = list_quotes(&pool).await.unwrap();
        let texts: Vec<_> = listings.iter().map(|l| l.quote.text.as_str()).collect();
        assert_eq!(texts, vec!["一つ目", "二つ目"]);
        assert!(listings.iter().all(|l| l.owner_username == "user_a"));
    }

    #[tokio::test]
    async fn test_update_requires_matching_owner() {
        let pool = init_memory_database().await.unwrap();
        let user_a = create_user(&pool, "user_a", "pw").await.unwrap();
        let user_b = create_user(&pool, "user_b", "pw").await.unwrap();
        let quote = insert_quote(&pool, user_a.id, &input("Aさんの歌詞")).await.unwrap();

        let changed = update_owned_quote(&pool, quote.id, user_b.id, &input("Illegal Edit Attempt"))
            .await
            .unwrap();
        assert!(!changed);
        assert_eq!(get_quote(&pool, quote.id).await.unwrap(), Some(quote.clone()));

        let changed = update_owned_quote(&pool, quote.id, user_a.id, &input("更新した歌詞"))
            .await
            .unwrap();
        assert!(changed);

        let stored = get_quote(&pool, quote.id).await.unwrap().unwrap();
        assert_eq!(stored.text, "更新した歌詞");
        assert_eq!(stored.owner_id, quote.owner_id);
        assert_eq!(stored.created_at, quote.created_at);
    }

    #[tokio::test]
    async fn test_delete_requires_matching_owner() {
        let pool = init_memory_database().await.unwrap();
        let user_a = create_user(&pool, "user_a", "pw").await.unwrap();
        let user_b = create_user(&pool, "user_b", "pw").await.unwrap();
        let quote = insert_quote(&pool, user_a.id, &input("Aさんの歌詞")).await.unwrap();

        assert!(!delete_owned_quote(&pool, quote.id, user_b.id).await.unwrap());
        assert!(get_quote(&pool, quote.id).await.unwrap().is_some());

        assert!(delete_owned_quote(&pool, quote.id, user_a.id).await.unwrap());
        assert!(get_quote(&pool, quote.id).await.unwrap().is_none());

        // Second delete finds nothing
        assert!(!delete_owned_quote(&pool, quote.id, user_a.id).await.unwrap());
    }
}
