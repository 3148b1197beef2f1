use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{ServiceError, ServiceResult};
use crate::api::{Listing, ListingUpdate, NewListing};
use crate::backend::{Direction, Document, DocumentStore, Fields, Query};
use crate::logic::search::matches_term;

pub const DEFAULT_RATING: f64 = 5.0;
pub const TOP_RATED_LIMIT: usize = 10;

/// The listing collection
#[derive(Clone)]
pub struct ListingService {
    documents: Arc<dyn DocumentStore>,
    collection: String,
}

/// Decode query hits, skipping documents that do not look like listings
fn decode_listings(docs: Vec<Document>) -> Vec<Listing> {
    docs.into_iter()
        .filter_map(|doc| match doc.decode::<Listing>() {
            Ok(mut listing) => {
                listing.id = doc.id;
                Some(listing)
            }
            Err(e) => {
                warn!("skipping malformed listing: {}", e);
                None
            }
        })
        .collect()
}

fn new_listing_fields(listing: &NewListing, user_id: &str) -> Fields {
    let rating = listing
        .rating
        .filter(|r| *r > 0.0)
        .unwrap_or(DEFAULT_RATING);
    let now = Utc::now();

    let mut fields = Fields::new();
    fields.insert("name".into(), listing.name.trim().into());
    fields.insert("category".into(), listing.category.as_str().into());
    fields.insert("description".into(), listing.description.trim().into());
    fields.insert("phone".into(), listing.phone.trim().into());
    fields.insert("email".into(), listing.email.trim().into());
    fields.insert("city".into(), listing.city.trim().into());
    fields.insert(
        "image".into(),
        listing.image.clone().unwrap_or_default().into(),
    );
    fields.insert("rating".into(), rating.into());
    fields.insert("userId".into(), user_id.into());
    fields.insert("createdAt".into(), now.into());
    fields.insert("updatedAt".into(), now.into());
    fields
}

fn update_fields(update: &ListingUpdate) -> Fields {
    let mut fields = Fields::new();
    let text = [
        ("name", &update.name),
        ("description", &update.description),
        ("phone", &update.phone),
        ("email", &update.email),
        ("city", &update.city),
        ("image", &update.image),
    ];
    for (key, value) in text {
        if let Some(value) = value {
            fields.insert(key.into(), value.as_str().into());
        }
    }
    if let Some(category) = update.category {
        fields.insert("category".into(), category.as_str().into());
    }
    if let Some(rating) = update.rating {
        fields.insert("rating".into(), rating.into());
    }
    fields.insert("updatedAt".into(), Utc::now().into());
    fields
}

impl ListingService {
    pub fn new(documents: Arc<dyn DocumentStore>, collection: &str) -> Self {
        Self {
            documents,
            collection: collection.to_string(),
        }
    }

    fn query(&self) -> Query {
        Query::new(&self.collection)
    }

    async fn run(&self, query: Query, message: &'static str) -> ServiceResult<Vec<Listing>> {
        debug!("listing query {:?}", query);
        let docs = self
            .documents
            .query(&query)
            .await
            .map_err(ServiceError::backend(message))?;
        Ok(decode_listings(docs))
    }

    /// Every listing, newest first
    pub async fn get_all(&self) -> ServiceResult<Vec<Listing>> {
        let query = self.query().order_by("createdAt", Direction::Descending);
        self.run(query, "Failed to fetch services").await
    }

    pub async fn get_by_category(&self, category: &str) -> ServiceResult<Vec<Listing>> {
        let query = self
            .query()
            .where_eq("category", category.to_lowercase())
            .order_by("createdAt", Direction::Descending);
        self.run(query, "Failed to fetch services").await
    }

    pub async fn get_by_user(&self, user_id: &str) -> ServiceResult<Vec<Listing>> {
        let query = self
            .query()
            .where_eq("userId", user_id)
            .order_by("createdAt", Direction::Descending);
        self.run(query, "Failed to fetch user services").await
    }

    pub async fn get_by_city(&self, city: &str) -> ServiceResult<Vec<Listing>> {
        let query = self
            .query()
            .where_eq("city", city)
            .order_by("createdAt", Direction::Descending);
        self.run(query, "Failed to fetch services").await
    }

    /// Highest stored rating first; `None` takes [`TOP_RATED_LIMIT`]
    pub async fn get_top_rated(&self, limit: Option<usize>) -> ServiceResult<Vec<Listing>> {
        let query = self
            .query()
            .order_by("rating", Direction::Descending)
            .limit(limit.unwrap_or(TOP_RATED_LIMIT));
        self.run(query, "Failed to fetch top rated services").await
    }

    /// Store a new listing owned by `user_id` and return its id
    pub async fn add(&self, listing: &NewListing, user_id: &str) -> ServiceResult<String> {
        if user_id.is_empty() {
            return Err(ServiceError::Rejected("User ID is required"));
        }

        self.documents
            .create(&self.collection, new_listing_fields(listing, user_id))
            .await
            .map_err(ServiceError::backend("Failed to add service"))
    }

    pub async fn update(&self, id: &str, update: &ListingUpdate) -> ServiceResult<()> {
        if id.is_empty() {
            return Err(ServiceError::Rejected("Service ID is required"));
        }

        self.documents
            .update(&self.collection, id, update_fields(update))
            .await
            .map_err(ServiceError::backend("Failed to update service"))
    }

    pub async fn update_rating(&self, id: &str, rating: f64) -> ServiceResult<()> {
        if id.is_empty() {
            return Err(ServiceError::Rejected("Service ID is required"));
        }
        if !(1.0..=5.0).contains(&rating) {
            return Err(ServiceError::Rejected("Rating must be between 1 and 5"));
        }

        let mut fields = Fields::new();
        fields.insert("rating".into(), rating.into());
        fields.insert("updatedAt".into(), Utc::now().into());

        self.documents
            .update(&self.collection, id, fields)
            .await
            .map_err(ServiceError::backend("Failed to update rating"))
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        if id.is_empty() {
            return Err(ServiceError::Rejected("Service ID is required"));
        }

        self.documents
            .delete(&self.collection, id)
            .await
            .map_err(ServiceError::backend("Failed to delete service"))
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Listing> {
        if id.is_empty() {
            return Err(ServiceError::Rejected("Service ID is required"));
        }

        let doc = self
            .documents
            .get(&self.collection, id)
            .await
            .map_err(ServiceError::backend("Failed to fetch service"))?
            .ok_or(ServiceError::Rejected("Service not found"))?;

        let mut listing: Listing = doc
            .decode()
            .map_err(ServiceError::backend("Failed to fetch service"))?;
        listing.id = doc.id;
        Ok(listing)
    }

    /// Substring search over name, description, category and city
    pub async fn search(&self, term: &str) -> ServiceResult<Vec<Listing>> {
        let all = self.get_all().await.map_err(|e| match e {
            ServiceError::Backend { source, .. } => ServiceError::Backend {
                message: "Failed to search services",
                source,
            },
            other => other,
        })?;
        Ok(all.into_iter().filter(|l| matches_term(l, term)).collect())
    }
}
