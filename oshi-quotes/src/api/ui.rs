//! Static asset serving

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::render::STYLE_CSS;

/// GET /static/style.css
pub async fn serve_style_css() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLE_CSS,
    )
        .into_response()
}
