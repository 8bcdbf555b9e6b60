//! Database models

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2id PHC string
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A posted lyric excerpt
///
/// `id`, `owner_id` and `created_at` are fixed at insert time; only the three
/// content fields are ever updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Quote {
    pub id: i64,
    pub owner_id: i64,
    pub text: String,
    pub artist: String,
    pub song_title: String,
    pub created_at: DateTime<Utc>,
}

impl Quote {
    /// Short human label: artist plus the first ten characters of the text
    ///
    /// ```
    /// # use oshi_common::db::Quote;
    /// # use chrono::Utc;
    /// let quote = Quote {
    ///     id: 1,
    ///     owner_id: 1,
    ///     text: "君の名前を呼んでいたんだ".to_string(),
    ///     artist: "歌手".to_string(),
    ///     song_title: "曲".to_string(),
    ///     created_at: Utc::now(),
    /// };
    /// assert_eq!(quote.label(), "歌手 - 君の名前を呼んでいた...");
    /// ```
    pub fn label(&self) -> String {
        let head: String = self.text.chars().take(10).collect();
        format!("{} - {}...", self.artist, head)
    }
}

/// Login session row; `expires_at` is Unix seconds
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: i64,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now.timestamp()
    }
}
