//! Session authentication
//!
//! The browser holds a random session token in the `sessionid` cookie; the
//! token maps to a user through the `sessions` table. Protected routes sit
//! behind [`require_login`], which redirects anonymous visitors to the login
//! page with a `next` parameter pointing back at the requested path.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Query, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use oshi_common::db::{sessions, users, User};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::api::quotes::QuoteError;
use crate::forms::LoginForm;
use crate::{render, AppState};

pub const SESSION_COOKIE: &str = "sessionid";
pub const LOGIN_PATH: &str = "/accounts/login/";
pub const LOGOUT_PATH: &str = "/accounts/logout/";

const LOGIN_FAILED: &str = "Please enter a correct username and password.";

/// The logged-in user, placed in request extensions by [`require_login`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// The logged-in user if there is one; for pages open to everyone
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = QuoteError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(CurrentUser(user)) = parts.extensions.get::<CurrentUser>() {
            return Ok(MaybeUser(Some(user.clone())));
        }

        let state = AppState::from_ref(state);
        Ok(MaybeUser(resolve_user(&state, &parts.headers).await?))
    }
}

/// Read the session token from the request's Cookie header(s)
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<Option<User>, QuoteError> {
    match session_token(headers) {
        Some(token) => Ok(sessions::find_session_user(&state.db, &token).await?),
        None => Ok(None),
    }
}

/// Login page URL that returns to `next` after logging in
///
/// Path segments are percent-encoded; the `/` separators stay literal.
///
/// ```
/// use oshi_quotes::api::login_redirect_url;
///
/// assert_eq!(login_redirect_url("/add/"), "/accounts/login/?next=/add/");
/// assert_eq!(
///     login_redirect_url("/quote/3/edit/?x=1"),
///     "/accounts/login/?next=/quote/3/edit/%3Fx%3D1"
/// );
/// ```
pub fn login_redirect_url(next: &str) -> String {
    let encoded: Vec<_> = next.split('/').map(urlencoding::encode).collect();
    format!("{}?next={}", LOGIN_PATH, encoded.join("/"))
}

/// Only follow local absolute paths after login; anything else goes home
///
/// Control characters are refused outright: browsers drop tab and newline
/// from URLs (turning `/\t/host` into `//host`), and they are not valid in a
/// `Location` header.
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path) if is_local_path(path) => path.to_string(),
        _ => "/".to_string(),
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
}

fn session_cookie(token: &str, ttl: chrono::Duration) -> String {
    format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE,
        token,
        ttl.num_seconds()
    )
}

fn expired_session_cookie() -> String {
    format!("{}=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE)
}

/// Middleware for routes that need a logged-in user
///
/// Anonymous requests are answered with a redirect to the login page carrying
/// the original path (and query) in `next`. Otherwise the user is attached to
/// the request as [`CurrentUser`].
pub async fn require_login(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, QuoteError> {
    match resolve_user(&state, request.headers()).await? {
        Some(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            Ok(next.run(request).await)
        }
        None => {
            let target = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            debug!("Anonymous request to {} redirected to login", target);
            Ok(Redirect::to(&login_redirect_url(target)).into_response())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// GET /accounts/login/
pub async fn show_login(Query(query): Query<LoginQuery>) -> Html<String> {
    Html(render::login_page(&safe_next(query.next.as_deref()), "", None))
}

/// POST /accounts/login/
///
/// On success starts a session, sets the cookie and redirects to `next`.
/// Wrong credentials redisplay the form with a generic message.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, QuoteError> {
    let next = safe_next(form.next.as_deref());

    let Some(user) = users::authenticate(&state.db, &form.username, &form.password).await? else {
        warn!("Failed login for username {:?}", form.username.trim());
        let page = render::login_page(&next, form.username.trim(), Some(LOGIN_FAILED));
        return Ok(Html(page).into_response());
    };

    let purged = sessions::purge_expired_sessions(&state.db).await?;
    if purged > 0 {
        debug!("Purged {} expired session(s)", purged);
    }

    let session = sessions::create_session(&state.db, user.id, state.session_ttl).await?;
    info!("User {} (id {}) logged in", user.username, user.id);

    Ok((
        [(header::SET_COOKIE, session_cookie(&session.token, state.session_ttl))],
        Redirect::to(&next),
    )
        .into_response())
}

/// POST /accounts/logout/
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, QuoteError> {
    if let Some(token) = session_token(&headers) {
        sessions::delete_session(&state.db, &token).await?;
    }

    Ok((
        [(header::SET_COOKIE, expired_session_cookie())],
        Redirect::to("/"),
    )
        .into_response())
}
