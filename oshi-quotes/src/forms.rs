//! HTML form payloads and validation
//!
//! Submitted values are trimmed. Fields a form does not declare (for example
//! an `owner_id` smuggled into the POST body) are dropped by deserialization,
//! so ownership can never come from the client.

use oshi_common::db::Quote;
use serde::Deserialize;

/// Maximum length of `artist` and `song_title`, in characters
pub const MAX_SHORT_FIELD_CHARS: usize = 100;

/// Create/edit form as submitted by the browser
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub song_title: String,
}

/// Validated quote content, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteInput {
    pub text: String,
    pub artist: String,
    pub song_title: String,
}

/// One validation problem, attached to the form field it concerns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl QuoteForm {
    /// Prefill the edit form from a stored quote
    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            text: quote.text.clone(),
            artist: quote.artist.clone(),
            song_title: quote.song_title.clone(),
        }
    }

    pub fn validate(&self) -> Result<QuoteInput, Vec<FieldError>> {
        let text = self.text.trim();
        let artist = self.artist.trim();
        let song_title = self.song_title.trim();

        let mut errors = Vec::new();
        require("text", text, None, &mut errors);
        require("artist", artist, Some(MAX_SHORT_FIELD_CHARS), &mut errors);
        require("song_title", song_title, Some(MAX_SHORT_FIELD_CHARS), &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(QuoteInput {
            text: text.to_string(),
            artist: artist.to_string(),
            song_title: song_title.to_string(),
        })
    }
}

fn require(field: &'static str, value: &str, max_chars: Option<usize>, errors: &mut Vec<FieldError>) {
    if value.is_empty() {
        errors.push(FieldError {
            field,
            message: "This field is required.".to_string(),
        });
        return;
    }

    if let Some(max) = max_chars {
        let len = value.chars().count();
        if len > max {
            errors.push(FieldError {
                field,
                message: format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    max, len
                ),
            });
        }
    }
}

/// Login form; `next` is echoed from the login page's hidden field
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}
