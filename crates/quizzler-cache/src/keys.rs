//! Cache key naming and invalidation helpers.
//!
//! Every key lives under the `quizzler:` namespace. Keys that group other keys
//! have a family prefix ending in `:`, so a prefix delete for deck 1 can never
//! reach deck 10 or a key of another entity type.

use tracing::warn;

use crate::Cache;

/// Namespace shared by every key this service writes.
const CACHE_PREFIX: &str = "quizzler";

fn build_key(parts: &[&str]) -> String {
    format!("{}:{}", CACHE_PREFIX, parts.join(":"))
}

fn family(parts: &[&str]) -> String {
    format!("{}:", build_key(parts))
}

/// Key for a single user by ID.
pub fn user(user_id: i64) -> String {
    build_key(&["user", &user_id.to_string()])
}

/// Key for the deck listing of a user.
pub fn user_decks(user_id: i64) -> String {
    build_key(&["user", &user_id.to_string(), "decks"])
}

/// Prefix of every listing cached for a user.
pub fn user_family(user_id: i64) -> String {
    family(&["user", &user_id.to_string()])
}

pub fn deck(deck_id: i64) -> String {
    build_key(&["deck", &deck_id.to_string()])
}

/// Key for the card listing of a deck.
pub fn deck_cards(deck_id: i64) -> String {
    build_key(&["deck", &deck_id.to_string(), "cards"])
}

/// Prefix of every listing cached for a deck.
pub fn deck_family(deck_id: i64) -> String {
    family(&["deck", &deck_id.to_string()])
}

pub fn card(card_id: i64) -> String {
    build_key(&["card", &card_id.to_string()])
}

/// Escapes the key separator so a free-form value stays one segment.
fn segment(value: &str) -> String {
    value.replace('%', "%25").replace(':', "%3A")
}

/// Fixed-window counter for one client on one route.
///
/// Both parts are free-form (paths may hold `:`, IPv6 addresses always do), so
/// each is escaped and the route/client boundary stays unambiguous.
pub fn rate_limit(route: &str, client: &str) -> String {
    build_key(&["ratelimit", &segment(route), &segment(client)])
}

/// Invalidation after relational writes.
///
/// Failures are logged and swallowed: a stale entry expires with its TTL, and
/// a write that already committed must not be reported as failed.
pub mod invalidate {
    use super::*;

    /// Call after updating or deleting a user.
    pub async fn user(cache: &Cache, user_id: i64) {
        if let Err(e) = cache.delete(&super::user(user_id)).await {
            warn!(error = %e, user_id = %user_id, "Failed to invalidate user cache");
        }
        if let Err(e) = cache.delete_by_prefix(&user_family(user_id)).await {
            warn!(error = %e, user_id = %user_id, "Failed to invalidate user listing caches");
        }
    }

    /// Call after creating, updating, or deleting a deck owned by `owner_id`.
    pub async fn deck(cache: &Cache, deck_id: i64, owner_id: i64) {
        if let Err(e) = cache.delete(&super::deck(deck_id)).await {
            warn!(error = %e, deck_id = %deck_id, "Failed to invalidate deck cache");
        }
        if let Err(e) = cache.delete_by_prefix(&deck_family(deck_id)).await {
            warn!(error = %e, deck_id = %deck_id, "Failed to invalidate deck listing caches");
        }
        if let Err(e) = cache.delete(&user_decks(owner_id)).await {
            warn!(error = %e, user_id = %owner_id, "Failed to invalidate user decks cache");
        }
    }

    /// Call after creating, updating, or deleting a card in `deck_id`.
    pub async fn card(cache: &Cache, card_id: i64, deck_id: i64) {
        if let Err(e) = cache.delete(&super::card(card_id)).await {
            warn!(error = %e, card_id = %card_id, "Failed to invalidate card cache");
        }
        if let Err(e) = cache.delete(&deck_cards(deck_id)).await {
            warn!(error = %e, deck_id = %deck_id, "Failed to invalidate deck cards cache");
        }
    }
}
