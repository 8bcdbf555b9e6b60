//! Quote list, create, edit and delete handlers
//!
//! Edit and delete load the target quote and run the ownership check before
//! anything else. A quote owned by someone else is answered exactly like a
//! quote that does not exist (404), so other users' records are never
//! confirmed.

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use oshi_common::db::{Quote, User};
use tracing::{error, info, warn};

use crate::api::auth::{CurrentUser, MaybeUser};
use crate::forms::QuoteForm;
use crate::ownership::is_owner;
use crate::{db, highlight, render, AppState};

/// GET /
///
/// All quotes plus one picked at random. Open to everyone.
pub async fn list_quotes(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
) -> Result<Html<String>, QuoteError> {
    let listings = db::list_quotes(&state.db).await?;
    let featured = highlight::pick(&listings, &mut rand::thread_rng());

    Ok(Html(render::list_page(viewer.as_ref(), &listings, featured)))
}

/// GET /add/
pub async fn show_create_form(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Html<String> {
    Html(render::quote_form_page(
        &user,
        "Post a quote",
        "/add/",
        &QuoteForm::default(),
        &[],
    ))
}

/// POST /add/
///
/// The new quote is always owned by the requester.
pub async fn create_quote(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(form): Form<QuoteForm>,
) -> Result<Response, QuoteError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let page = render::quote_form_page(&user, "Post a quote", "/add/", &form, &errors);
            return Ok(Html(page).into_response());
        }
    };

    let quote = db::insert_quote(&state.db, user.id, &input).await?;
    info!("User {} created quote {}", user.id, quote.id);

    Ok(Redirect::to("/").into_response())
}

/// GET /quote/:id/edit/
pub async fn show_edit_form(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Html<String>, QuoteError> {
    let quote = load_owned_quote(&state, &user, &id).await?;

    Ok(Html(render::quote_form_page(
        &user,
        "Edit quote",
        &edit_path(quote.id),
        &QuoteForm::from_quote(&quote),
        &[],
    )))
}

/// POST /quote/:id/edit/
///
/// Only `text`, `artist` and `song_title` are taken from the form. The body
/// is decoded after the ownership check, so a non-owner always sees 404.
pub async fn update_quote(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    form: Result<Form<QuoteForm>, FormRejection>,
) -> Result<Response, QuoteError> {
    let quote = load_owned_quote(&state, &user, &id).await?;
    let Form(form) = form.map_err(QuoteError::Form)?;

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let page =
                render::quote_form_page(&user, "Edit quote", &edit_path(quote.id), &form, &errors);
            return Ok(Html(page).into_response());
        }
    };

    if !db::update_owned_quote(&state.db, quote.id, user.id, &input).await? {
        return Err(QuoteError::NotFound);
    }
    info!("User {} updated quote {}", user.id, quote.id);

    Ok(Redirect::to("/").into_response())
}

/// GET /quote/:id/delete/
pub async fn confirm_delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Html<String>, QuoteError> {
    let quote = load_owned_quote(&state, &user, &id).await?;
    Ok(Html(render::confirm_delete_page(&user, &quote)))
}

/// POST /quote/:id/delete/
pub async fn delete_quote(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Response, QuoteError> {
    let quote = load_owned_quote(&state, &user, &id).await?;

    if !db::delete_owned_quote(&state.db, quote.id, user.id).await? {
        return Err(QuoteError::NotFound);
    }
    info!("User {} deleted quote {}", user.id, quote.id);

    Ok(Redirect::to("/").into_response())
}

fn edit_path(id: i64) -> String {
    format!("/quote/{}/edit/", id)
}

/// Fetch a quote for mutation by `user`, or fail with NotFound
async fn load_owned_quote(state: &AppState, user: &User, raw_id: &str) -> Result<Quote, QuoteError> {
    let id: i64 = raw_id.parse().map_err(|_| QuoteError::NotFound)?;

    let quote = db::get_quote(&state.db, id)
        .await?
        .ok_or(QuoteError::NotFound)?;

    if !is_owner(user, &quote) {
        warn!("User {} denied access to quote {} (not the owner)", user.id, id);
        return Err(QuoteError::NotFound);
    }

    Ok(quote)
}

/// Quote handler errors
#[derive(Debug)]
pub enum QuoteError {
    /// Missing quote, malformed id, or a quote the requester does not own
    NotFound,
    /// Request body that is not a valid form submission
    Form(FormRejection),
    Storage(String),
}

impl From<oshi_common::Error> for QuoteError {
    fn from(e: oshi_common::Error) -> Self {
        match e {
            oshi_common::Error::NotFound(_) => QuoteError::NotFound,
            other => QuoteError::Storage(other.to_string()),
        }
    }
}

impl IntoResponse for QuoteError {
    fn into_response(self) -> Response {
        match self {
            QuoteError::NotFound => {
                (StatusCode::NOT_FOUND, Html(render::not_found_page())).into_response()
            }
            QuoteError::Form(rejection) => rejection.into_response(),
            QuoteError::Storage(msg) => {
                error!("Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(render::server_error_page()),
                )
                    .into_response()
            }
        }
    }
}
