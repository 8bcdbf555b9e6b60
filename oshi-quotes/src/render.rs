//! Server-side HTML rendering
//!
//! Page templates are embedded at compile time and filled with `{{name}}`
//! placeholders in a single pass, so substituted text is never scanned for
//! further placeholders. Everything that originates from a user goes through
//! [`escape_html`] first.

use oshi_common::db::{Quote, User};

use crate::api::LOGOUT_PATH;
use crate::db::QuoteListing;
use crate::forms::{FieldError, QuoteForm};

const BASE_HTML: &str = include_str!("../ui/base.html");
const QUOTE_FORM_HTML: &str = include_str!("../ui/quote_form.html");
const LOGIN_HTML: &str = include_str!("../ui/login.html");
const CONFIRM_DELETE_HTML: &str = include_str!("../ui/confirm_delete.html");
pub const STYLE_CSS: &str = include_str!("../ui/style.css");

/// Escape text for use in HTML content and double-quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Replace `{{name}}` placeholders; unknown names are left as written
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after[..end];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push_str("{{");
                out.push_str(name);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

fn layout(title: &str, viewer: Option<&User>, content: &str) -> String {
    let nav = match viewer {
        Some(user) => format!(
            r#"<span class="user">{}</span> <a href="/add/">Post a quote</a> <form method="post" action="{}"><button type="submit">Log out</button></form>"#,
            escape_html(&user.username),
            LOGOUT_PATH
        ),
        None => r#"<a href="/accounts/login/">Log in</a>"#.to_string(),
    };

    let title = escape_html(title);
    fill(
        BASE_HTML,
        &[
            ("title", title.as_str()),
            ("nav", nav.as_str()),
            ("content", content),
        ],
    )
}

fn quote_block(listing: &QuoteListing, viewer: Option<&User>) -> String {
    let quote = &listing.quote;

    let actions = match viewer {
        Some(user) if crate::ownership::is_owner(user, quote) => format!(
            r#"<div class="actions"><a href="/quote/{id}/edit/">Edit</a> <a href="/quote/{id}/delete/">Delete</a></div>"#,
            id = quote.id
        ),
        _ => String::new(),
    };

    format!(
        r#"<article class="quote" id="quote-{id}">
  <blockquote>{text}</blockquote>
  <div class="meta">{artist} &ldquo;{song_title}&rdquo; &middot; posted by {owner} on {date}</div>
  {actions}
</article>"#,
        id = quote.id,
        text = escape_html(&quote.text),
        artist = escape_html(&quote.artist),
        song_title = escape_html(&quote.song_title),
        owner = escape_html(&listing.owner_username),
        date = quote.created_at.format("%Y-%m-%d"),
        actions = actions,
    )
}

/// Quote list with the featured pick on top
pub fn list_page(
    viewer: Option<&User>,
    listings: &[QuoteListing],
    featured: Option<&QuoteListing>,
) -> String {
    let mut content = String::new();

    if let Some(pick) = featured {
        content.push_str(&format!(
            r#"<section class="featured"><h2>Today's pick</h2>{}</section>"#,
            quote_block(pick, viewer)
        ));
    }

    content.push_str("<h1>All quotes</h1>\n");

    if listings.is_empty() {
        content.push_str(r#"<p class="empty">No quotes yet.</p>"#);
    } else {
        for listing in listings {
            content.push_str(&quote_block(listing, viewer));
            content.push('\n');
        }
    }

    layout("Quotes", viewer, &content)
}

fn error_list(errors: &[FieldError], field: &str) -> String {
    let items: Vec<String> = errors
        .iter()
        .filter(|e| e.field == field)
        .map(|e| format!("<li>{}</li>", escape_html(&e.message)))
        .collect();

    if items.is_empty() {
        String::new()
    } else {
        format!(r#"<ul class="errorlist">{}</ul>"#, items.join(""))
    }
}

/// Create or edit form, redisplaying submitted values and field errors
pub fn quote_form_page(
    viewer: &User,
    heading: &str,
    action: &str,
    form: &QuoteForm,
    errors: &[FieldError],
) -> String {
    let summary = if errors.is_empty() {
        String::new()
    } else {
        r#"<p class="errorlist">Please correct the errors below.</p>"#.to_string()
    };

    let heading_html = escape_html(heading);
    let action = escape_html(action);
    let text = escape_html(&form.text);
    let artist = escape_html(&form.artist);
    let song_title = escape_html(&form.song_title);
    let text_errors = error_list(errors, "text");
    let artist_errors = error_list(errors, "artist");
    let song_title_errors = error_list(errors, "song_title");

    let content = fill(
        QUOTE_FORM_HTML,
        &[
            ("heading", heading_html.as_str()),
            ("errors", summary.as_str()),
            ("action", action.as_str()),
            ("text", text.as_str()),
            ("artist", artist.as_str()),
            ("song_title", song_title.as_str()),
            ("text_errors", text_errors.as_str()),
            ("artist_errors", artist_errors.as_str()),
            ("song_title_errors", song_title_errors.as_str()),
        ],
    );

    layout(heading, Some(viewer), &content)
}

pub fn login_page(next: &str, username: &str, error: Option<&str>) -> String {
    let error = error
        .map(|msg| format!(r#"<p class="errorlist">{}</p>"#, escape_html(msg)))
        .unwrap_or_default();

    let next = escape_html(next);
    let username = escape_html(username);

    let content = fill(
        LOGIN_HTML,
        &[
            ("error", error.as_str()),
            ("next", next.as_str()),
            ("username", username.as_str()),
        ],
    );

    layout("Log in", None, &content)
}

pub fn confirm_delete_page(viewer: &User, quote: &Quote) -> String {
    let action = format!("/quote/{}/delete/", quote.id);
    let label = escape_html(&quote.label());
    let content = fill(
        CONFIRM_DELETE_HTML,
        &[("label", label.as_str()), ("action", action.as_str())],
    );

    layout("Delete quote", Some(viewer), &content)
}

pub fn not_found_page() -> String {
    layout(
        "Not found",
        None,
        "<h1>Not found</h1>\n<p>The requested quote does not exist.</p>",
    )
}

pub fn server_error_page() -> String {
    layout(
        "Server error",
        None,
        "<h1>Server error</h1>\n<p>Something went wrong. Please try again later.</p>",
    )
}
