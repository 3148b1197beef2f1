//! Sorting comparison logic
//!
//! Pure functions for ordering listings by the selectable sort keys.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::api::Listing;
use crate::SortMode;

fn created(listing: &Listing) -> DateTime<Utc> {
    listing.created_at.unwrap_or(DateTime::UNIX_EPOCH)
}

/// Compare two listings according to the given sort mode
///
/// # Sort Rules
/// - Newest / Oldest: by `createdAt`; a missing timestamp counts as the epoch
/// - RatingHigh / RatingLow: by the stored `rating`
/// - Name: case-insensitive ascending, exact case breaks ties
pub fn compare_listings(a: &Listing, b: &Listing, mode: SortMode) -> Ordering {
    match mode {
        SortMode::Newest => created(b).cmp(&created(a)),
        SortMode::Oldest => created(a).cmp(&created(b)),
        SortMode::RatingHigh => b.rating.total_cmp(&a.rating),
        SortMode::RatingLow => a.rating.total_cmp(&b.rating),
        SortMode::Name => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    }
}

/// Stable sort: equal keys keep their relative order
pub fn sort_listings(listings: &mut [Listing], mode: SortMode) {
    listings.sort_by(|a, b| compare_listings(a, b, mode));
}
