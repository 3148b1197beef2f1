//! Rating display logic
//!
//! Cards show the average of a listing's reviews; list rows show the stored
//! `rating` field.

use crate::api::{Listing, Review};

/// Average at or above which a listing is badged "Top Rated"
pub const TOP_RATED_THRESHOLD: f64 = 4.5;

/// Mean review rating, `None` when there are no reviews
///
/// # Examples
/// ```
/// use servicefinder::api::Review;
/// use servicefinder::logic::rating::average_rating;
///
/// let review = |rating| Review {
///     rating,
///     comment: String::new(),
///     user_name: String::new(),
///     user_id: None,
///     created_at: None,
/// };
///
/// assert_eq!(average_rating(&[review(4.0), review(5.0)]), Some(4.5));
/// assert_eq!(average_rating(&[]), None);
/// ```
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let total: f64 = reviews.iter().map(|r| r.rating).sum();
    Some(total / reviews.len() as f64)
}

pub fn is_top_rated(listing: &Listing) -> bool {
    average_rating(&listing.reviews).is_some_and(|avg| avg >= TOP_RATED_THRESHOLD)
}

/// Card label: one decimal plus review count, or "No ratings"
pub fn review_summary(listing: &Listing) -> String {
    match average_rating(&listing.reviews) {
        Some(avg) => {
            let count = listing.reviews.len();
            let noun = if count == 1 { "review" } else { "reviews" };
            format!("{:.1} ({} {})", avg, count, noun)
        }
        None => "No ratings".to_string(),
    }
}
