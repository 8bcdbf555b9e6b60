//! Quote storage for the web service

mod quotes;

pub use quotes::{
    delete_owned_quote, get_quote, insert_quote, list_quotes, update_owned_quote, QuoteListing,
};
