//! Shared helpers for oshi-quotes integration tests
//!
//! Every test gets its own in-memory database and router. Logged-in requests
//! carry a session cookie minted directly through the sessions table.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use oshi_common::db::{init_memory_database, sessions, users, Quote, User};
use oshi_quotes::{build_router, db, forms::QuoteForm, AppState};
use sqlx::SqlitePool;

pub const PASSWORD: &str = "correct horse battery staple";

pub struct TestApp {
    pub pool: SqlitePool,
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = init_memory_database()
            .await
            .expect("Should create in-memory database");
        let router = build_router(AppState::new(pool.clone(), chrono::Duration::hours(1)));
        Self { pool, router }
    }

    /// Fresh router over the same database (`oneshot` consumes the service)
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    pub async fn user(&self, username: &str) -> User {
        users::create_user(&self.pool, username, PASSWORD)
            .await
            .expect("Should create user")
    }

    /// Cookie header value for a freshly started session of `user`
    pub async fn cookie_for(&self, user: &User) -> String {
        let session = sessions::create_session(&self.pool, user.id, chrono::Duration::hours(1))
            .await
            .expect("Should create session");
        format!("sessionid={}", session.token)
    }

    pub async fn quote(&self, owner: &User, text: &str, artist: &str, song_title: &str) -> Quote {
        let form = QuoteForm {
            text: text.to_string(),
            artist: artist.to_string(),
            song_title: song_title.to_string(),
        };
        let input = form.validate().expect("Fixture quote should be valid");
        db::insert_quote(&self.pool, owner.id, &input)
            .await
            .expect("Should insert quote")
    }

    pub async fn stored(&self, id: i64) -> Option<Quote> {
        db::get_quote(&self.pool, id).await.expect("Should query quote")
    }

    pub async fn quote_count(&self) -> usize {
        db::list_quotes(&self.pool)
            .await
            .expect("Should list quotes")
            .len()
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// URL-encoded form POST
pub fn post_form(uri: &str, cookie: Option<&str>, fields: &[(&str, &str)]) -> Request<Body> {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

pub async fn body_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8")
}

pub fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("Response should carry a Location header")
}
