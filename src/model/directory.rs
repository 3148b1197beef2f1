//! Directory Model
//!
//! The fetched listing collection, the active criteria, and the visible page
//! derived from them. The visible subset is recomputed whenever the source or
//! any criterion changes, and the page returns to 1 when it is.

use crate::api::{Category, Listing};
use crate::logic::pagination::Pagination;
use crate::logic::search::{city_options, filter_listings, ListingFilters};
use crate::logic::sorting::sort_listings;
use crate::logic::ui::cycle_index;
use crate::SortMode;

/// Minimum-rating steps offered by the filter (0 = off)
pub const MIN_RATING_STEPS: [f64; 5] = [0.0, 3.0, 3.5, 4.0, 4.5];

#[derive(Clone, Debug)]
pub struct DirectoryModel {
    /// Everything the last fetch returned, newest first
    pub listings: Vec<Listing>,

    pub filters: ListingFilters,
    pub sort: SortMode,

    /// Filtered and sorted subset
    pub visible: Vec<Listing>,
    pub pagination: Pagination,

    /// Selected row within the current page
    pub selected: usize,

    pub city_options: Vec<String>,

    pub loading: bool,
    pub error: Option<String>,

    /// Bumped on every recomputation
    pub generation: u64,
}

impl DirectoryModel {
    pub fn new(page_size: usize) -> Self {
        Self {
            listings: Vec::new(),
            filters: ListingFilters::default(),
            sort: SortMode::default(),
            visible: Vec::new(),
            pagination: Pagination::new(page_size),
            selected: 0,
            city_options: Vec::new(),
            loading: true,
            error: None,
            generation: 0,
        }
    }

    /// Replace the source collection after a fetch
    pub fn set_listings(&mut self, listings: Vec<Listing>) {
        self.city_options = city_options(&listings);
        if let Some(city) = &self.filters.city {
            if !self.city_options.contains(city) {
                self.filters.city = None;
            }
        }
        self.listings = listings;
        self.loading = false;
        self.error = None;
        self.recompute();
    }

    pub fn set_error(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }

    fn recompute(&mut self) {
        let mut visible = filter_listings(&self.listings, &self.filters);
        sort_listings(&mut visible, self.sort);
        self.pagination.reset(visible.len());
        self.visible = visible;
        self.selected = 0;
        self.generation += 1;
    }

    /// Apply a new search term as typed; unchanged terms do nothing.
    /// A term of only whitespace clears the search.
    pub fn set_search(&mut self, term: &str) {
        let term = if term.trim().is_empty() { "" } else { term };
        if self.filters.search != term {
            self.filters.search = term.to_string();
            self.recompute();
        }
    }

    pub fn set_category(&mut self, category: Option<Category>) {
        if self.filters.category != category {
            self.filters.category = category;
            self.recompute();
        }
    }

    pub fn set_city(&mut self, city: Option<String>) {
        if self.filters.city != city {
            self.filters.city = city;
            self.recompute();
        }
    }

    pub fn set_min_rating(&mut self, min_rating: f64) {
        if self.filters.min_rating != min_rating {
            self.filters.min_rating = min_rating;
            self.recompute();
        }
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        if self.sort != sort {
            self.sort = sort;
            self.recompute();
        }
    }

    pub fn clear_filters(&mut self) {
        if self.filters != ListingFilters::default() {
            self.filters = ListingFilters::default();
            self.recompute();
        }
    }

    /// "All" → each category → "All"
    pub fn cycle_category(&mut self, forward: bool) {
        let mut options: Vec<Option<Category>> = vec![None];
        options.extend(Category::ALL.iter().copied().map(Some));
        let idx = options
            .iter()
            .position(|c| *c == self.filters.category)
            .unwrap_or(0);
        self.set_category(options[cycle_index(idx, options.len(), forward)]);
    }

    pub fn cycle_city(&mut self, forward: bool) {
        let mut options: Vec<Option<String>> = vec![None];
        options.extend(self.city_options.iter().cloned().map(Some));
        let idx = options
            .iter()
            .position(|c| *c == self.filters.city)
            .unwrap_or(0);
        self.set_city(options[cycle_index(idx, options.len(), forward)].clone());
    }

    pub fn cycle_min_rating(&mut self) {
        let idx = MIN_RATING_STEPS
            .iter()
            .position(|r| *r == self.filters.min_rating)
            .unwrap_or(0);
        self.set_min_rating(MIN_RATING_STEPS[cycle_index(idx, MIN_RATING_STEPS.len(), true)]);
    }

    pub fn page_items(&self) -> &[Listing] {
        &self.visible[self.pagination.range()]
    }

    pub fn selected_listing(&self) -> Option<&Listing> {
        self.page_items().get(self.selected)
    }

    pub fn select_next(&mut self) {
        let len = self.page_items().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.page_items().len().saturating_sub(1);
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.pagination.go_to(page);
        self.selected = 0;
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.pagination.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.pagination.page.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(name: &str, city: &str, rating: f64) -> Listing {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "category": "plumbing",
            "city": city,
            "rating": rating,
        }))
        .unwrap()
    }

    fn many(n: usize) -> Vec<Listing> {
        (0..n).map(|i| listing(&format!("L{:02}", i), "Durban", 4.0)).collect()
    }

    #[test]
    fn test_new_directory_is_loading() {
        let d = DirectoryModel::new(9);
        assert!(d.loading);
        assert!(d.page_items().is_empty());
        assert_eq!(d.pagination.total_pages(), 1);
    }

    #[test]
    fn test_source_replacement_resets_page() {
        let mut d = DirectoryModel::new(9);
        d.set_listings(many(20));
        d.go_to_page(3);
        assert_eq!(d.page_items().len(), 2);

        d.set_listings(many(20));
        assert_eq!(d.pagination.page, 1);
        assert_eq!(d.page_items().len(), 9);
    }

    #[test]
    fn test_criteria_change_resets_page() {
        let mut d = DirectoryModel::new(9);
        d.set_listings(many(20));
        d.go_to_page(2);
        d.set_sort(SortMode::Name);
        assert_eq!(d.pagination.page, 1);
    }

    #[test]
    fn test_unchanged_criteria_do_not_recompute() {
        let mut d = DirectoryModel::new(9);
        d.set_listings(many(3));
        let gen = d.generation;
        d.set_search("");
        d.set_category(None);
        d.set_sort(SortMode::Newest);
        assert_eq!(d.generation, gen);
    }

    #[test]
    fn test_search_term_kept_as_typed() {
        let mut d = DirectoryModel::new(9);
        d.set_listings(vec![listing("A", "Capetown", 4.0), listing("B", "Cape Town", 4.0)]);

        d.set_search("cape ");
        assert_eq!(d.filters.search, "cape ");
        assert_eq!(d.visible.len(), 1);
        assert_eq!(d.visible[0].city, "Cape Town");

        d.set_search("   ");
        assert_eq!(d.filters.search, "");
        assert_eq!(d.visible.len(), 2);
    }

    #[test]
    fn test_cycle_city_uses_fetched_cities() {
        let mut d = DirectoryModel::new(9);
        d.set_listings(vec![listing("A", "Durban", 4.0), listing("B", "Cape Town", 4.0)]);
        d.cycle_city(true);
        assert_eq!(d.filters.city.as_deref(), Some("Cape Town"));
        assert_eq!(d.visible.len(), 1);
        d.cycle_city(true);
        d.cycle_city(true);
        assert_eq!(d.filters.city, None);
    }

    #[test]
    fn test_vanished_city_filter_is_dropped() {
        let mut d = DirectoryModel::new(9);
        d.set_listings(vec![listing("A", "Durban", 4.0)]);
        d.set_city(Some("Durban".into()));
        d.set_listings(vec![listing("B", "Cape Town", 4.0)]);
        assert_eq!(d.filters.city, None);
        assert_eq!(d.visible.len(), 1);
    }

    #[test]
    fn test_min_rating_cycle() {
        let mut d = DirectoryModel::new(9);
        d.set_listings(vec![listing("A", "Durban", 3.2), listing("B", "Durban", 4.8)]);
        d.cycle_min_rating();
        assert_eq!(d.filters.min_rating, 3.0);
        assert_eq!(d.visible.len(), 2);
        d.cycle_min_rating();
        d.cycle_min_rating();
        assert_eq!(d.filters.min_rating, 4.0);
        assert_eq!(d.visible.len(), 1);
    }

    #[test]
    fn test_selection_stays_on_page() {
        let mut d = DirectoryModel::new(9);
        d.set_listings(many(11));
        d.go_to_page(2);
        d.select_next();
        d.select_next();
        assert_eq!(d.selected, 1);
        assert_eq!(d.selected_listing().map(|l| l.name.as_str()), Some("L10"));
    }
}
