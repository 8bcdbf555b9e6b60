//! HTTP handlers for oshi-quotes

pub mod auth;
pub mod buildinfo;
pub mod health;
pub mod quotes;
pub mod ui;

pub use auth::{
    login, login_redirect_url, logout, require_login, show_login, CurrentUser, MaybeUser,
    LOGIN_PATH, LOGOUT_PATH, SESSION_COOKIE,
};
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use quotes::{
    confirm_delete, create_quote, delete_quote, list_quotes, show_create_form, show_edit_form,
    update_quote, QuoteError,
};
pub use ui::serve_style_css;
