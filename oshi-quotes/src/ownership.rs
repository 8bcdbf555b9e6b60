//! Ownership check gating edit and delete
//!
//! A quote may only be changed by the user who posted it. Handlers call
//! [`is_owner`] after loading the record and before touching storage; a
//! failed check is reported exactly like a missing record.

use oshi_common::db::{Quote, User};

/// Does `requester` own `quote`?
pub fn is_owner(requester: &User, quote: &Quote) -> bool {
    requester.id == quote.owner_id
}
