//! Search and filter logic
//!
//! Pure functions deciding which listings are visible for a set of criteria.
//! All active criteria must hold (AND); the search term itself is an OR over
//! name, description, category and city.

use crate::api::{Category, Listing};

/// Filter criteria other than sorting. `None` / `0.0` mean "All" / off.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilters {
    pub search: String,
    pub category: Option<Category>,
    pub city: Option<String>,
    pub min_rating: f64,
}

impl ListingFilters {
    pub fn is_active(&self) -> bool {
        !self.search.is_empty()
            || self.category.is_some()
            || self.city.is_some()
            || self.min_rating > 0.0
    }
}

/// Case-insensitive substring test over the searchable fields
///
/// # Examples
/// ```
/// use servicefinder::api::Listing;
/// use servicefinder::logic::search::matches_term;
///
/// let listing: Listing = serde_json::from_value(serde_json::json!({
///     "name": "Joe's Plumbing",
///     "category": "plumbing",
///     "city": "Durban"
/// })).unwrap();
///
/// assert!(matches_term(&listing, "PLUMB"));
/// assert!(matches_term(&listing, "durb"));
/// assert!(matches_term(&listing, ""));
/// assert!(!matches_term(&listing, "roof"));
/// ```
pub fn matches_term(listing: &Listing, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }

    let needle = term.to_lowercase();
    [
        &listing.name,
        &listing.description,
        &listing.category,
        &listing.city,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}

pub fn listing_matches(listing: &Listing, filters: &ListingFilters) -> bool {
    if !matches_term(listing, &filters.search) {
        return false;
    }

    if let Some(category) = filters.category {
        if listing.category != category.as_str() {
            return false;
        }
    }

    if let Some(city) = &filters.city {
        if &listing.city != city {
            return false;
        }
    }

    if filters.min_rating > 0.0 && listing.rating < filters.min_rating {
        return false;
    }

    true
}

/// Listings passing every active filter, in their original order
pub fn filter_listings(listings: &[Listing], filters: &ListingFilters) -> Vec<Listing> {
    listings
        .iter()
        .filter(|l| listing_matches(l, filters))
        .cloned()
        .collect()
}

/// Distinct non-empty cities, sorted
pub fn city_options(listings: &[Listing]) -> Vec<String> {
    let mut cities: Vec<String> = listings
        .iter()
        .map(|l| l.city.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    cities.sort();
    cities.dedup();
    cities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(name: &str, category: &str, city: &str, rating: f64) -> Listing {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "category": category,
            "city": city,
            "description": format!("{} services", category),
            "rating": rating,
        }))
        .unwrap()
    }

    fn sample() -> Vec<Listing> {
        vec![
            listing("Joe's Plumbing", "plumbing", "Durban", 4.8),
            listing("Bright Spark", "electrical", "Durban", 3.5),
            listing("Cape Painters", "painting", "Cape Town", 4.1),
        ]
    }

    #[test]
    fn test_search_plumb_matches_name_and_category() {
        let filters = ListingFilters {
            search: "plumb".into(),
            ..Default::default()
        };
        let visible = filter_listings(&sample(), &filters);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Joe's Plumbing");
    }

    #[test]
    fn test_search_matches_description() {
        let filters = ListingFilters {
            search: "ELECTRICAL SERV".into(),
            ..Default::default()
        };
        assert_eq!(filter_listings(&sample(), &filters).len(), 1);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let filters = ListingFilters {
            city: Some("Durban".into()),
            min_rating: 4.0,
            ..Default::default()
        };
        let visible = filter_listings(&sample(), &filters);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].category, "plumbing");
    }

    #[test]
    fn test_category_filter_exact() {
        let filters = ListingFilters {
            category: Some(Category::Painting),
            ..Default::default()
        };
        let visible = filter_listings(&sample(), &filters);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].city, "Cape Town");
    }

    #[test]
    fn test_no_filters_keeps_everything_in_order() {
        let filters = ListingFilters::default();
        assert!(!filters.is_active());
        let names: Vec<_> = filter_listings(&sample(), &filters)
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["Joe's Plumbing", "Bright Spark", "Cape Painters"]);
    }

    #[test]
    fn test_city_options_are_distinct_and_sorted() {
        assert_eq!(city_options(&sample()), vec!["Cape Town", "Durban"]);
    }
}
