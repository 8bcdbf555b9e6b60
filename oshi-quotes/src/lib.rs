//! oshi-quotes library
//!
//! A small site where logged-in users post favourite lyric lines ("quotes")
//! with the artist and song title. Anyone may browse; only the poster of a
//! quote may edit or delete it.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod forms;
pub mod highlight;
pub mod ownership;
pub mod render;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Lifetime of a login session
    pub session_ttl: chrono::Duration,
}

impl AppState {
    pub fn new(db: SqlitePool, session_ttl: chrono::Duration) -> Self {
        Self { db, session_ttl }
    }
}

/// Build application router
///
/// Create, edit and delete routes sit behind [`api::require_login`]; edit and
/// delete additionally check ownership inside the handlers.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Protected routes (require a logged-in user)
    let protected = Router::new()
        .route("/add/", get(api::show_create_form).post(api::create_quote))
        .route(
            "/quote/:id/edit/",
            get(api::show_edit_form).post(api::update_quote),
        )
        .route(
            "/quote/:id/delete/",
            get(api::confirm_delete).post(api::delete_quote),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_login,
        ));

    // Public routes
    let public = Router::new()
        .route("/", get(api::list_quotes))
        .route(api::LOGIN_PATH, get(api::show_login).post(api::login))
        .route(api::LOGOUT_PATH, post(api::logout))
        .route("/static/style.css", get(api::serve_style_css))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
